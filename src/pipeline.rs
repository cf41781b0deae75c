//! Shared state of the command pipeline.
//!
//! ```text
//!  UART RX IRQ ──► LineCapture ──wake──► extractor ──commands──► dispatcher
//!                       │                                          │  │
//!                       └──wake──► menu producer                   │  └─► ToggleTimer
//!                                       │                          │
//!                                       └──────────► writer ◄──────┘
//!                                                      │
//!                                                  UART TX
//! ```
//!
//! One [`Pipeline`] exists per firmware image, in a `static`. Every task gets a
//! shared reference; the queues and signals inside do the locking. The
//! command pool lives outside the pipeline so the queue can hold commands that
//! borrow it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::capture::LineCapture;
use crate::command::{Command, CommandPool};
use crate::config::{COMMAND_QUEUE_DEPTH, WRITER_QUEUE_DEPTH};
use crate::log_info;
use crate::response::ResponseText;
use crate::shutdown::Shutdown;
use crate::toggle::ToggleTimer;

/// Extractor -> dispatcher queue. Senders wait when it is full.
pub type CommandQueue<'p> = Channel<CriticalSectionRawMutex, Command<'p>, COMMAND_QUEUE_DEPTH>;

/// (Menu producer, dispatcher) -> writer queue. FIFO across both producers.
pub type WriterQueue = Channel<CriticalSectionRawMutex, ResponseText, WRITER_QUEUE_DEPTH>;

pub struct Pipeline<'p> {
    /// Interrupt-fed line buffer and its wake signals.
    pub capture: LineCapture,
    pub commands: CommandQueue<'p>,
    pub writer: WriterQueue,
    pub shutdown: Shutdown,
    pub toggle_timer: ToggleTimer,
    pool: &'p CommandPool,
}

impl<'p> Pipeline<'p> {
    pub const fn new(pool: &'p CommandPool) -> Self {
        Self {
            capture: LineCapture::new(),
            commands: Channel::new(),
            writer: Channel::new(),
            shutdown: Shutdown::new(),
            toggle_timer: ToggleTimer::new(),
            pool,
        }
    }

    #[inline]
    pub fn pool(&self) -> &'p CommandPool { self.pool }

    /// Stop taking input and tell every task to exit.
    ///
    /// Capture is disabled before the broadcast, so no line typed after EXIT
    /// reaches the extractor.
    pub fn request_shutdown(&self) {
        self.capture.disable();
        if self.shutdown.request() {
            log_info!("Shutdown requested, {} tasks to stop", self.shutdown.live_tasks());
        }
    }
}
