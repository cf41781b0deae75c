//! Pico 2 adapters for the pipeline's collaborator traits.
//!
//! - LED: GPIO25 (on-board LED)
//! - UART0: TX on GPIO0, RX on GPIO1, 115200 8N1
//! - Clock: soft RTC running from the embassy time driver

use core::cell::RefCell;

use defmt::warn;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::uart::{Blocking, UartTx};
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Instant;
use serial_command_pipeline::clock::{DateTime, SoftRtc};
use serial_command_pipeline::hal::{Clock, Indicator, SerialTx};

/// Priority of the UART0 RX interrupt. Above the thread-mode executor, below
/// the time driver's default.
pub const UART_RX_PRIORITY: Priority = Priority::P3;

// =============================================================================
// LED
// =============================================================================

/// On-board LED shared by the dispatcher and the toggle timer engine.
pub struct BoardLed {
    pin: Mutex<CriticalSectionRawMutex, RefCell<Output<'static>>>,
}

impl BoardLed {
    pub fn new(pin: Output<'static>) -> Self {
        Self {
            pin: Mutex::new(RefCell::new(pin)),
        }
    }
}

impl Indicator for BoardLed {
    fn set(
        &self,
        on: bool,
    ) {
        let level = if on { Level::High } else { Level::Low };
        self.pin.lock(|pin| pin.borrow_mut().set_level(level));
    }

    fn is_on(&self) -> bool { self.pin.lock(|pin| pin.borrow().is_set_high()) }

    fn toggle(&self) { self.pin.lock(|pin| pin.borrow_mut().toggle()); }
}

// =============================================================================
// UART
// =============================================================================

/// Blocking UART0 transmitter. Each byte waits for room in the TX FIFO.
pub struct UartWriter {
    tx: UartTx<'static, Blocking>,
}

impl UartWriter {
    pub const fn new(tx: UartTx<'static, Blocking>) -> Self { Self { tx } }
}

impl SerialTx for UartWriter {
    fn transmit(
        &mut self,
        bytes: &[u8],
    ) {
        if let Err(e) = self.tx.blocking_write(bytes) {
            warn!("UART write failed: {}", e);
        }
    }
}

/// Unmask the UART0 receive and receive-timeout interrupts.
///
/// The blocking driver leaves both masked; the handler in `main.rs` drains the
/// RX FIFO on either.
pub fn enable_rx_interrupt() {
    let regs = embassy_rp::pac::UART0;
    regs.uarticr().write(|w| {
        w.set_rxic(true);
        w.set_rtic(true);
    });
    regs.uartimsc().modify(|w| {
        w.set_rxim(true);
        w.set_rtim(true);
    });

    let irq = interrupt::UART0_IRQ;
    irq.unpend();
    irq.set_priority(UART_RX_PRIORITY);
    // SAFETY: the handler only touches the static pipeline, whose capture cell
    // is guarded by a critical section
    unsafe { irq.enable() };
}

// =============================================================================
// Clock
// =============================================================================

/// Calendar clock derived from uptime.
pub struct UptimeClock {
    rtc: SoftRtc,
}

impl UptimeClock {
    pub const fn new(epoch: DateTime) -> Self { Self { rtc: SoftRtc::new(epoch) } }
}

impl Clock for UptimeClock {
    fn now(&self) -> DateTime { self.rtc.read(Instant::now().as_secs()) }
}
