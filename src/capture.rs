//! Interrupt-side line capture.
//!
//! The UART RX interrupt feeds bytes into [`LineCapture::on_byte_received`]. The
//! bytes accumulate in a [`RawLineBuffer`] that lives behind a critical-section
//! mutex, so the interrupt (single producer) and the command extractor (single
//! consumer) never touch it at the same time.
//!
//! # Handoff
//!
//! When the terminator arrives the interrupt appends the finished line to a
//! small FIFO and resets the cursor straight away, so typing (or a pasted
//! burst of lines) can continue while the extractor has not run yet. It then
//! raises two payload-free wake signals, one for the extractor and one for the
//! menu producer. Wakes coalesce, so the extractor drains every pending line
//! per wake. A line is dropped only when the FIFO is already full. On embassy the
//! signal wakes the waiting task's executor; the task runs as soon as the
//! interrupt returns, which is the "yield on higher-priority wake" of a
//! classic RTOS.
//!
//! # Overrun
//!
//! Bytes beyond [`LINE_CAPACITY`] are dropped, never written out of bounds, and
//! the line is flagged. The flag travels with the queued line so the extractor
//! can reject it.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::Deque;

use crate::config::{LINE_CAPACITY, LINE_TERMINATOR, PENDING_LINES};

/// What the interrupt did with one received byte.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CaptureEvent {
    /// Appended to the current line.
    Stored,
    /// Line full; byte dropped and the line flagged.
    Overrun,
    /// Terminator seen; line queued and both waiters woken.
    LineComplete,
    /// Terminator seen but the pending FIFO was full; line dropped.
    LineDropped,
    /// Capture disabled by shutdown; byte ignored.
    Ignored,
}

/// A finished input line, copied out of the capture buffer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CapturedLine {
    bytes: [u8; LINE_CAPACITY],
    len: usize,
    overrun: bool,
}

impl CapturedLine {
    /// Line content without the terminator.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes[..self.len] }

    /// First byte of the line, `None` for an empty line.
    #[inline]
    pub fn first_byte(&self) -> Option<u8> { self.as_bytes().first().copied() }

    /// True if bytes were dropped because the line exceeded its capacity.
    #[inline]
    pub const fn overrun(&self) -> bool { self.overrun }
}

/// Byte accumulator written from interrupt context.
pub struct RawLineBuffer {
    bytes: [u8; LINE_CAPACITY],
    len: usize,
    overrun: bool,
    pending: Deque<CapturedLine, PENDING_LINES>,
    dropped_lines: u32,
    dropped_bytes: u32,
}

impl RawLineBuffer {
    pub const fn new() -> Self {
        Self {
            bytes: [0; LINE_CAPACITY],
            len: 0,
            overrun: false,
            pending: Deque::new(),
            dropped_lines: 0,
            dropped_bytes: 0,
        }
    }

    /// Append one byte, queueing the line on the terminator.
    pub fn push(
        &mut self,
        byte: u8,
    ) -> CaptureEvent {
        if byte == LINE_TERMINATOR {
            let line = CapturedLine {
                bytes: self.bytes,
                len: self.len,
                overrun: self.overrun,
            };
            self.len = 0;
            self.overrun = false;
            return match self.pending.push_back(line) {
                Ok(()) => CaptureEvent::LineComplete,
                Err(_) => {
                    self.dropped_lines = self.dropped_lines.wrapping_add(1);
                    CaptureEvent::LineDropped
                }
            };
        }

        if self.len < LINE_CAPACITY {
            self.bytes[self.len] = byte;
            self.len += 1;
            CaptureEvent::Stored
        } else {
            self.overrun = true;
            self.dropped_bytes = self.dropped_bytes.wrapping_add(1);
            CaptureEvent::Overrun
        }
    }

    /// Remove the oldest finished line, if any.
    #[inline]
    pub fn take(&mut self) -> Option<CapturedLine> { self.pending.pop_front() }

    /// Finished lines waiting for the extractor.
    #[inline]
    pub fn pending(&self) -> usize { self.pending.len() }

    /// Bytes in the line currently being typed.
    #[inline]
    pub const fn len(&self) -> usize { self.len }

    #[inline]
    pub const fn is_empty(&self) -> bool { self.len == 0 }
}

impl Default for RawLineBuffer {
    fn default() -> Self { Self::new() }
}

/// Counters kept by the capture buffer since boot.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct CaptureStats {
    /// Finished lines dropped because the pending FIFO was full.
    pub dropped_lines: u32,
    /// Bytes dropped because a line was full.
    pub dropped_bytes: u32,
}

/// Single-producer (interrupt) / single-consumer (extractor) line cell plus
/// the two wake signals raised on every completed line.
pub struct LineCapture {
    line: Mutex<CriticalSectionRawMutex, RefCell<RawLineBuffer>>,
    enabled: AtomicBool,
    command_wake: Signal<CriticalSectionRawMutex, ()>,
    menu_wake: Signal<CriticalSectionRawMutex, ()>,
}

impl LineCapture {
    pub const fn new() -> Self {
        Self {
            line: Mutex::new(RefCell::new(RawLineBuffer::new())),
            enabled: AtomicBool::new(true),
            command_wake: Signal::new(),
            menu_wake: Signal::new(),
        }
    }

    /// Interrupt entry point: handle one received byte.
    ///
    /// Never blocks. On a completed line both wake signals are raised.
    pub fn on_byte_received(
        &self,
        byte: u8,
    ) -> CaptureEvent {
        if !self.enabled.load(Ordering::Acquire) {
            return CaptureEvent::Ignored;
        }

        let event = self.line.lock(|line| line.borrow_mut().push(byte));
        if event == CaptureEvent::LineComplete {
            self.command_wake.signal(());
            self.menu_wake.signal(());
        }
        event
    }

    /// Consume the oldest pending line inside a critical section.
    ///
    /// `read` runs with interrupts masked, so it must stay O(line length).
    /// Returns `None` if no line is pending.
    pub fn take_line_with<R>(
        &self,
        read: impl FnOnce(&CapturedLine) -> R,
    ) -> Option<R> {
        self.line.lock(|line| line.borrow_mut().take().as_ref().map(read))
    }

    /// Finished lines not yet taken by the extractor.
    pub fn pending_lines(&self) -> usize { self.line.lock(|line| line.borrow().pending()) }

    /// Wait until a line completes (command extractor side).
    pub async fn wait_line(&self) { self.command_wake.wait().await }

    /// Wait until a line completes (menu producer side).
    pub async fn wait_menu_request(&self) { self.menu_wake.wait().await }

    /// Stop accepting input. Irreversible.
    pub fn disable(&self) { self.enabled.store(false, Ordering::Release); }

    #[inline]
    pub fn is_enabled(&self) -> bool { self.enabled.load(Ordering::Acquire) }

    pub fn stats(&self) -> CaptureStats {
        self.line.lock(|line| {
            let line = line.borrow();
            CaptureStats {
                dropped_lines: line.dropped_lines,
                dropped_bytes: line.dropped_bytes,
            }
        })
    }
}

impl Default for LineCapture {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================
