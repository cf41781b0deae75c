//! Board collaborators the pipeline drives.
//!
//! The firmware implements these on top of embassy-rp (LED GPIO, UART0, soft
//! RTC); unit tests implement them with plain memory.

use crate::clock::DateTime;

/// The LED the commands act on.
///
/// Methods take `&self`: the dispatcher and the toggle timer both drive the
/// same pin, so implementations keep the pin behind their own lock.
pub trait Indicator {
    fn set(
        &self,
        on: bool,
    );

    /// Current output level.
    fn is_on(&self) -> bool;

    fn toggle(&self) { self.set(!self.is_on()); }
}

/// Blocking serial transmitter.
pub trait SerialTx {
    /// Send every byte, waiting on the transmitter for each one.
    fn transmit(
        &mut self,
        bytes: &[u8],
    );
}

/// Source of wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime;
}

impl<T: Indicator + ?Sized> Indicator for &T {
    fn set(
        &self,
        on: bool,
    ) {
        (**self).set(on);
    }

    fn is_on(&self) -> bool { (**self).is_on() }

    fn toggle(&self) { (**self).toggle(); }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime { (**self).now() }
}
