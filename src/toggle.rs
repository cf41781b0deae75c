//! Periodic LED toggle.
//!
//! Two halves:
//! - [`ToggleTimer`]: the software timer itself, shared between the dispatcher
//!   (which arms and disarms it) and the timer engine task (which waits out the
//!   period and flips the LED on every expiry).
//! - [`PeriodicToggle`]: the dispatcher-owned state machine
//!   `Uncreated -> Running <-> Stopped`. The timer is created on the first
//!   start and only ever stopped afterwards, never destroyed.
//!
//! Both transitions are idempotent: starting a running toggle re-arms it with a
//! fresh period, stopping one that is not running does nothing.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;

use crate::hal::Indicator;
use crate::log_info;

/// Instruction for the timer engine. Only the latest one matters.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerControl {
    /// (Re)start with this period, measured from now.
    Arm(Duration),
    /// Stop firing.
    Disarm,
}

impl TimerControl {
    /// Period to run with after this instruction, `None` when disarmed.
    #[inline]
    pub const fn period(self) -> Option<Duration> {
        match self {
            Self::Arm(period) => Some(period),
            Self::Disarm => None,
        }
    }
}

/// The recurring software timer behind the toggle.
pub struct ToggleTimer {
    control: Signal<CriticalSectionRawMutex, TimerControl>,
    instances: AtomicU8,
    armed: AtomicBool,
    expiries: AtomicU32,
}

impl ToggleTimer {
    pub const fn new() -> Self {
        Self {
            control: Signal::new(),
            instances: AtomicU8::new(0),
            armed: AtomicBool::new(false),
            expiries: AtomicU32::new(0),
        }
    }

    fn create(&self) { self.instances.fetch_add(1, Ordering::AcqRel); }

    fn arm(
        &self,
        period: Duration,
    ) {
        self.armed.store(true, Ordering::Release);
        self.control.signal(TimerControl::Arm(period));
    }

    fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
        self.control.signal(TimerControl::Disarm);
    }

    /// Wait for the next arm/disarm instruction (timer engine side).
    pub async fn next_control(&self) -> TimerControl { self.control.wait().await }

    /// Timer callback: flip the LED once.
    pub fn fire<I: Indicator>(
        &self,
        indicator: &I,
    ) {
        indicator.toggle();
        self.expiries.fetch_add(1, Ordering::Relaxed);
    }

    /// Timers created since boot. Never more than one.
    #[inline]
    pub fn instances(&self) -> u8 { self.instances.load(Ordering::Acquire) }

    #[inline]
    pub fn is_armed(&self) -> bool { self.armed.load(Ordering::Acquire) }

    /// Times the callback ran.
    #[inline]
    pub fn expiries(&self) -> u32 { self.expiries.load(Ordering::Relaxed) }
}

impl Default for ToggleTimer {
    fn default() -> Self { Self::new() }
}

/// Lifecycle of the toggle timer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum ToggleState {
    /// Never started; no timer exists yet.
    Uncreated,
    /// Created, not firing.
    Stopped,
    /// Created and firing every period.
    Running,
}

/// Dispatcher-owned toggle state machine.
pub struct PeriodicToggle<'t> {
    timer: &'t ToggleTimer,
    period: Duration,
    state: ToggleState,
}

impl<'t> PeriodicToggle<'t> {
    pub const fn new(
        timer: &'t ToggleTimer,
        period: Duration,
    ) -> Self {
        Self {
            timer,
            period,
            state: ToggleState::Uncreated,
        }
    }

    /// Start toggling. Creates the timer the first time, re-arms afterwards.
    pub fn start(&mut self) {
        if self.state == ToggleState::Uncreated {
            self.timer.create();
            log_info!("Toggle timer created, period {} ms", self.period.as_millis());
        }
        self.timer.arm(self.period);
        self.state = ToggleState::Running;
    }

    /// Stop toggling. Returns `false` (and does nothing) if not running.
    pub fn stop(&mut self) -> bool {
        if self.state != ToggleState::Running {
            return false;
        }
        self.timer.disarm();
        self.state = ToggleState::Stopped;
        true
    }

    #[inline]
    pub const fn state(&self) -> ToggleState { self.state }

    #[inline]
    pub const fn is_running(&self) -> bool { matches!(self.state, ToggleState::Running) }
}

// =============================================================================
// Unit Tests
// =============================================================================
