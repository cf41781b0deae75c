//! Cortex-M33 DWT cycle counter.
//!
//! The dispatcher stamps each command with the cycles it took so slow handlers
//! show up in the RTT log. CYCCNT is 32 bits and wraps every ~28.6 s at the
//! stock 150 MHz; [`elapsed`] uses wrapping subtraction, which is exact for
//! anything shorter than that.

use core::sync::atomic::{AtomicU32, Ordering};

/// Core clock in Hz, set by [`init`]. Defaults to the stock RP2350 clock.
static CPU_FREQ_HZ: AtomicU32 = AtomicU32::new(150_000_000);

/// Elapsed counts above this are treated as a bad measurement.
/// About one second at 150 MHz; no command handler comes close.
const MAX_SANE_CYCLES: u32 = 150_000_000;

/// Enable the DWT cycle counter and record the core clock.
///
/// Call once after `embassy_rp::init()`. Calling it again is harmless.
pub fn init(freq_hz: u32) {
    CPU_FREQ_HZ.store(freq_hz.max(1), Ordering::Relaxed);

    // DEMCR.TRCENA (bit 24) first, then DWT.CTRL.CYCCNTENA (bit 0)
    #[cfg(target_arch = "arm")]
    unsafe {
        use core::ptr::{read_volatile, write_volatile};

        const DEMCR: *mut u32 = 0xE000_EDFC as *mut u32;
        write_volatile(DEMCR, read_volatile(DEMCR) | (1 << 24));

        const DWT_CTRL: *mut u32 = 0xE000_1000 as *mut u32;
        write_volatile(DWT_CTRL, read_volatile(DWT_CTRL) | 1);
    }
}

/// Current cycle count (32-bit, wraps).
#[inline]
pub fn read() -> u32 {
    #[cfg(target_arch = "arm")]
    unsafe {
        // DWT CYCCNT
        const DWT_CYCCNT: *const u32 = 0xE000_1004 as *const u32;
        core::ptr::read_volatile(DWT_CYCCNT)
    }
    #[cfg(not(target_arch = "arm"))]
    {
        0
    }
}

/// Cycles between two readings, 0 if the span is implausibly long.
#[inline]
pub fn elapsed(
    start: u32,
    end: u32,
) -> u32 {
    let elapsed = end.wrapping_sub(start);
    if elapsed > MAX_SANE_CYCLES { 0 } else { elapsed }
}

#[inline]
pub fn freq_hz() -> u32 { CPU_FREQ_HZ.load(Ordering::Relaxed) }

/// Convert a cycle count to microseconds at the configured clock.
pub fn cycles_to_micros(cycles: u32) -> u32 {
    let freq = u64::from(freq_hz());
    (u64::from(cycles) * 1_000_000 / freq) as u32
}

// =============================================================================
// Unit Tests (run on host with: cargo test --lib --target <host-triple>)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_normal() {
        assert_eq!(elapsed(100, 200), 100);
        assert_eq!(elapsed(0, 1000), 1000);
    }

    #[test]
    fn test_elapsed_wrap() {
        assert_eq!(elapsed(u32::MAX - 100, 100), 201);
    }

    #[test]
    fn test_elapsed_sanity_check() {
        assert_eq!(elapsed(0, MAX_SANE_CYCLES + 1), 0);
    }

    #[test]
    fn test_cycles_to_micros_at_default_clock() {
        // Tests share the static; only the default clock is used here
        assert_eq!(freq_hz(), 150_000_000);
        assert_eq!(cycles_to_micros(150), 1);
        assert_eq!(cycles_to_micros(150_000), 1_000);
        assert_eq!(cycles_to_micros(0), 0);
    }
}
