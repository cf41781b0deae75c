//! Decoded user commands and the pool that bounds how many exist at once.
//!
//! A [`Command`] is a move-only record. The extractor allocates it from the
//! [`CommandPool`], moves it through the command queue, and the dispatcher drops
//! it when the action is done. Dropping returns the slot to the pool, so the
//! slot is released exactly once no matter which branch the dispatcher took.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::config::{COMMAND_ARGS_LEN, COMMAND_POOL_SIZE};
use crate::error::PipelineError;

/// Action selected by the single-digit command byte.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum CommandCode {
    /// `0`: stop every task and idle.
    Exit,
    /// `1`: LED on.
    LedOn,
    /// `2`: LED off.
    LedOff,
    /// `3`: start blinking the LED.
    ToggleStart,
    /// `4`: stop blinking the LED.
    ToggleStop,
    /// `5`: report the LED state.
    ReadStatus,
    /// `6`: report the RTC date and time.
    ReadClock,
    /// Anything else, with the raw decoded value.
    Invalid(u8),
}

impl CommandCode {
    /// Map a decoded numeric code to its action.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Exit,
            1 => Self::LedOn,
            2 => Self::LedOff,
            3 => Self::ToggleStart,
            4 => Self::ToggleStop,
            5 => Self::ReadStatus,
            6 => Self::ReadClock,
            other => Self::Invalid(other),
        }
    }

    /// Decode the first byte of a line: ASCII digit minus `'0'`.
    ///
    /// Non-digit bytes wrap around to values above 9 and therefore decode as
    /// [`CommandCode::Invalid`].
    #[inline]
    pub const fn from_ascii(byte: u8) -> Self { Self::from_raw(byte.wrapping_sub(b'0')) }

    /// Numeric code as the user typed it.
    pub const fn raw(self) -> u8 {
        match self {
            Self::Exit => 0,
            Self::LedOn => 1,
            Self::LedOff => 2,
            Self::ToggleStart => 3,
            Self::ToggleStop => 4,
            Self::ReadStatus => 5,
            Self::ReadClock => 6,
            Self::Invalid(raw) => raw,
        }
    }
}

/// One decoded request awaiting dispatch.
///
/// Not `Clone`: exactly one owner exists for each allocation.
#[derive(Debug)]
pub struct Command<'p> {
    code: CommandCode,
    args: [u8; COMMAND_ARGS_LEN],
    slot: Slot<'p>,
}

impl Command<'_> {
    #[inline]
    pub const fn code(&self) -> CommandCode { self.code }

    /// Argument bytes. The protocol defines none, so these stay zeroed.
    #[inline]
    pub const fn args(&self) -> &[u8; COMMAND_ARGS_LEN] { &self.args }

    /// Mutable argument bytes, for the extractor's argument hook.
    #[inline]
    pub fn args_mut(&mut self) -> &mut [u8; COMMAND_ARGS_LEN] { &mut self.args }

    /// Replace the code once the line has been read.
    #[inline]
    pub fn set_code(
        &mut self,
        code: CommandCode,
    ) {
        self.code = code;
    }
}

/// Pool slot held by a live command; returned on drop.
#[derive(Debug)]
struct Slot<'p> {
    pool: &'p CommandPool,
}

impl Drop for Slot<'_> {
    fn drop(&mut self) { self.pool.release(); }
}

/// Fixed-capacity allocator for [`Command`] records.
///
/// Only the slot count is tracked: the record itself moves by value through the
/// queue, so there is no backing storage to hand out.
#[derive(Debug)]
pub struct CommandPool {
    in_use: AtomicUsize,
    capacity: usize,
    allocated_total: AtomicUsize,
}

impl CommandPool {
    /// Pool sized for the configured command queue.
    pub const fn new() -> Self { Self::with_capacity(COMMAND_POOL_SIZE) }

    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            in_use: AtomicUsize::new(0),
            capacity,
            allocated_total: AtomicUsize::new(0),
        }
    }

    /// Allocate a blank command (code [`CommandCode::Invalid`], zeroed args).
    ///
    /// Returns [`PipelineError::CommandPoolExhausted`] when every slot is live.
    pub fn allocate(&self) -> Result<Command<'_>, PipelineError> {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                (used < self.capacity).then_some(used + 1)
            })
            .map_err(|_| PipelineError::CommandPoolExhausted)?;
        self.allocated_total.fetch_add(1, Ordering::Relaxed);

        Ok(Command {
            code: CommandCode::Invalid(u8::MAX),
            args: [0; COMMAND_ARGS_LEN],
            slot: Slot { pool: self },
        })
    }

    fn release(&self) { self.in_use.fetch_sub(1, Ordering::AcqRel); }

    /// Commands currently alive (queued or being handled).
    #[inline]
    pub fn in_use(&self) -> usize { self.in_use.load(Ordering::Acquire) }

    /// Commands allocated since boot.
    #[inline]
    pub fn allocated_total(&self) -> usize { self.allocated_total.load(Ordering::Relaxed) }

    #[inline]
    pub const fn capacity(&self) -> usize { self.capacity }
}

impl Default for CommandPool {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================
