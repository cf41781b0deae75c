//! Logging macros shared by the library and the firmware.
//!
//! On the RP2350 every macro forwards to the matching `defmt` macro, so output
//! goes out over RTT like the rest of the firmware. On the host (unit tests)
//! they expand to nothing but still borrow their arguments, which keeps
//! "unused variable" warnings away and means no defmt logger has to be linked.
//!
//! # Usage
//!
//! ```ignore
//! use crate::{log_info, log_warn};
//!
//! log_info!("Writer task started");
//! log_warn!("Line overrun, {} bytes dropped", dropped);
//! ```
//!
//! Format strings follow defmt syntax; stick to plain `{}` placeholders.

/// Log a message at Info level.
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(target_arch = "arm")]
        ::defmt::info!($fmt $(, $arg)*);
        #[cfg(not(target_arch = "arm"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

/// Log a message at Warn level.
#[macro_export]
macro_rules! log_warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(target_arch = "arm")]
        ::defmt::warn!($fmt $(, $arg)*);
        #[cfg(not(target_arch = "arm"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

/// Log a message at Error level.
#[macro_export]
macro_rules! log_error {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(target_arch = "arm")]
        ::defmt::error!($fmt $(, $arg)*);
        #[cfg(not(target_arch = "arm"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

/// Log a message at Debug level.
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(target_arch = "arm")]
        ::defmt::debug!($fmt $(, $arg)*);
        #[cfg(not(target_arch = "arm"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}
