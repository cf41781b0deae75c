//! Cooperative shutdown for the EXIT command.
//!
//! Every long-running task subscribes once at start and races each of its
//! waits against the broadcast via [`ShutdownListener::run_until`]. When EXIT
//! is dispatched the broadcast fires, each task leaves its own loop and drops
//! its listener. The last listener to go wakes the supervisor, which then masks
//! interrupts and idles.

use core::future::Future;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_sync::watch::{Receiver, Watch};

use crate::config::SHUTDOWN_RECEIVERS;
use crate::error::PipelineError;

/// One-shot, irreversible stop broadcast plus a count of tasks still running.
pub struct Shutdown {
    broadcast: Watch<CriticalSectionRawMutex, (), SHUTDOWN_RECEIVERS>,
    requested: AtomicBool,
    live: AtomicUsize,
    all_stopped: Signal<CriticalSectionRawMutex, ()>,
}

impl Shutdown {
    pub const fn new() -> Self {
        Self {
            broadcast: Watch::new(),
            requested: AtomicBool::new(false),
            live: AtomicUsize::new(0),
            all_stopped: Signal::new(),
        }
    }

    /// Register a task. The task counts as running until the listener drops.
    pub fn subscribe(&self) -> Result<ShutdownListener<'_>, PipelineError> {
        let receiver = self.broadcast.receiver().ok_or(PipelineError::ShutdownReceiversExhausted)?;
        self.live.fetch_add(1, Ordering::AcqRel);
        Ok(ShutdownListener {
            receiver,
            shutdown: self,
        })
    }

    /// Fire the broadcast. Returns `false` if it had already fired.
    pub fn request(&self) -> bool {
        if self.requested.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.broadcast.sender().send(());
        if self.live.load(Ordering::Acquire) == 0 {
            self.all_stopped.signal(());
        }
        true
    }

    #[inline]
    pub fn is_requested(&self) -> bool { self.requested.load(Ordering::Acquire) }

    /// Tasks that have subscribed and not yet exited.
    #[inline]
    pub fn live_tasks(&self) -> usize { self.live.load(Ordering::Acquire) }

    /// Resolve once shutdown was requested and every subscribed task exited.
    pub async fn wait_all_stopped(&self) {
        while !(self.is_requested() && self.live_tasks() == 0) {
            self.all_stopped.wait().await;
        }
    }

    fn task_exited(&self) {
        let was = self.live.fetch_sub(1, Ordering::AcqRel);
        if was == 1 && self.is_requested() {
            self.all_stopped.signal(());
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self { Self::new() }
}

/// A task's subscription to the shutdown broadcast.
pub struct ShutdownListener<'a> {
    receiver: Receiver<'a, CriticalSectionRawMutex, (), SHUTDOWN_RECEIVERS>,
    shutdown: &'a Shutdown,
}

impl ShutdownListener<'_> {
    /// Wait for the broadcast.
    pub async fn wait(&mut self) { self.receiver.changed().await }

    /// Drive `fut` unless shutdown fires first; `None` means stop.
    ///
    /// Shutdown is polled first, so once it fired no further queue operation
    /// completes through this call.
    pub async fn run_until<F: Future>(
        &mut self,
        fut: F,
    ) -> Option<F::Output> {
        match select(self.wait(), fut).await {
            Either::First(()) => None,
            Either::Second(output) => Some(output),
        }
    }
}

impl Drop for ShutdownListener<'_> {
    fn drop(&mut self) { self.shutdown.task_exited(); }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;

    #[test]
    fn test_request_is_one_shot() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_requested());
        assert!(shutdown.request());
        assert!(!shutdown.request());
        assert!(shutdown.is_requested());
    }

    #[test]
    fn test_run_until_passes_output_before_shutdown() {
        let shutdown = Shutdown::new();
        let mut listener = shutdown.subscribe().unwrap();
        assert_eq!(block_on(listener.run_until(async { 7 })), Some(7));
    }

    #[test]
    fn test_run_until_prefers_shutdown() {
        let shutdown = Shutdown::new();
        let mut listener = shutdown.subscribe().unwrap();
        shutdown.request();
        // Both sides are ready; shutdown wins
        assert_eq!(block_on(listener.run_until(async { 7 })), None);
    }

    #[test]
    fn test_late_subscriber_sees_shutdown() {
        let shutdown = Shutdown::new();
        shutdown.request();
        let mut listener = shutdown.subscribe().unwrap();
        assert_eq!(block_on(listener.run_until(core::future::pending::<()>())), None);
    }

    #[test]
    fn test_live_count_follows_listeners() {
        let shutdown = Shutdown::new();
        let a = shutdown.subscribe().unwrap();
        let b = shutdown.subscribe().unwrap();
        assert_eq!(shutdown.live_tasks(), 2);
        shutdown.request();
        drop(a);
        assert_eq!(shutdown.live_tasks(), 1);
        drop(b);
        assert_eq!(shutdown.live_tasks(), 0);
        block_on(shutdown.wait_all_stopped());
    }

    #[test]
    fn test_receiver_limit() {
        let shutdown = Shutdown::new();
        let _listeners: Vec<_> = (0..SHUTDOWN_RECEIVERS).map(|_| shutdown.subscribe().unwrap()).collect();
        assert_eq!(shutdown.subscribe().err(), Some(PipelineError::ShutdownReceiversExhausted));
    }
}
