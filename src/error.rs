//! Unrecoverable pipeline errors.
//!
//! Everything a user can cause (unknown command, over-long line, stopping a
//! toggle that never started) is handled where it happens and reported as text.
//! The variants below mean the firmware can no longer make progress; task
//! runners return them and the firmware halts.

use core::fmt;

/// Fatal conditions surfaced by the pipeline tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum PipelineError {
    /// No free command record. The pool is sized for a full queue plus one
    /// record at each end, so this means a record was leaked.
    CommandPoolExhausted,
    /// More tasks subscribed to the shutdown broadcast than it has slots for.
    ShutdownReceiversExhausted,
    /// A formatted response did not fit its fixed buffer.
    ResponseOverflow,
}

impl fmt::Display for PipelineError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::CommandPoolExhausted => f.write_str("command pool exhausted"),
            Self::ShutdownReceiversExhausted => f.write_str("shutdown receivers exhausted"),
            Self::ResponseOverflow => f.write_str("response text overflow"),
        }
    }
}
