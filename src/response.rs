//! Text records for the writer queue.
//!
//! A [`ResponseText`] owns its bytes (or points at a `'static` string), so once
//! it is on the writer queue nothing the producer does afterwards can
//! invalidate it. The writer drops it after the last byte is transmitted.

use core::fmt::Write;

use heapless::String;

use crate::clock::DateTime;
use crate::config::{INVALID_COMMAND_MSG, MENU, RESPONSE_CAPACITY};
use crate::error::PipelineError;

/// Outbound text for the writer task.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ResponseText {
    /// Process-lifetime text (menu, fixed messages).
    Static(&'static str),
    /// Text formatted for one command.
    Formatted(String<RESPONSE_CAPACITY>),
}

impl ResponseText {
    /// The menu banner.
    #[inline]
    pub const fn menu() -> Self { Self::Static(MENU) }

    /// Fixed reply to an unknown command.
    #[inline]
    pub const fn invalid_command() -> Self { Self::Static(INVALID_COMMAND_MSG) }

    /// `"\r\nEl estado del LED es: <0|1>\r\n"`.
    pub fn led_status(on: bool) -> Result<Self, PipelineError> {
        let mut text = String::new();
        write!(text, "\r\nEl estado del LED es: {}\r\n", u8::from(on)).map_err(|_| PipelineError::ResponseOverflow)?;
        Ok(Self::Formatted(text))
    }

    /// `"\r\nHora: HH:MM:SS \r\n Fecha: DD:MM:YY\r\n"`.
    pub fn clock_report(now: DateTime) -> Result<Self, PipelineError> {
        let mut text = String::new();
        write!(
            text,
            "\r\nHora: {:02}:{:02}:{:02} \r\n Fecha: {:02}:{:02}:{:02}\r\n",
            now.hours, now.minutes, now.seconds, now.day, now.month, now.year
        )
        .map_err(|_| PipelineError::ResponseOverflow)?;
        Ok(Self::Formatted(text))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(text) => text,
            Self::Formatted(text) => text.as_str(),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] { self.as_str().as_bytes() }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_status_format() {
        assert_eq!(ResponseText::led_status(true).unwrap().as_str(), "\r\nEl estado del LED es: 1\r\n");
        assert_eq!(ResponseText::led_status(false).unwrap().as_str(), "\r\nEl estado del LED es: 0\r\n");
    }

    #[test]
    fn test_clock_report_zero_pads() {
        let now = DateTime {
            hours: 9,
            minutes: 5,
            seconds: 3,
            day: 7,
            month: 2,
            year: 4,
        };
        assert_eq!(
            ResponseText::clock_report(now).unwrap().as_str(),
            "\r\nHora: 09:05:03 \r\n Fecha: 07:02:04\r\n"
        );
    }

    #[test]
    fn test_clock_report_fits_at_widest() {
        let now = DateTime {
            hours: 23,
            minutes: 59,
            seconds: 59,
            day: 31,
            month: 12,
            year: 99,
        };
        assert!(ResponseText::clock_report(now).is_ok());
    }

    #[test]
    fn test_static_texts() {
        assert_eq!(ResponseText::menu().as_str(), MENU);
        assert_eq!(ResponseText::invalid_command().as_bytes(), INVALID_COMMAND_MSG.as_bytes());
    }
}
