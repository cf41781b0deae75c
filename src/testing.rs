//! Host test doubles and a session driver for the task runners.

use core::cell::{Cell, RefCell};
use core::future::Future;

use embassy_futures::block_on;
use embassy_futures::join::{join, join4};
use embassy_futures::yield_now;

use crate::capture::CaptureEvent;
use crate::clock::DateTime;
use crate::error::PipelineError;
use crate::hal::{Clock, Indicator, SerialTx};
use crate::pipeline::Pipeline;
use crate::tasks::{Dispatcher, run_command_extractor, run_menu_producer, run_writer};

/// LED stand-in that counts writes.
pub struct MockLed {
    on: Cell<bool>,
    writes: Cell<u32>,
}

impl MockLed {
    pub fn new(on: bool) -> Self {
        Self {
            on: Cell::new(on),
            writes: Cell::new(0),
        }
    }

    pub fn writes(&self) -> u32 { self.writes.get() }
}

impl Indicator for MockLed {
    fn set(
        &self,
        on: bool,
    ) {
        self.on.set(on);
        self.writes.set(self.writes.get() + 1);
    }

    fn is_on(&self) -> bool { self.on.get() }
}

/// Clock that always reads the same instant.
#[derive(Clone, Copy)]
pub struct FixedClock(pub DateTime);

impl Clock for FixedClock {
    fn now(&self) -> DateTime { self.0 }
}

/// Collects everything the writer transmits.
#[derive(Default)]
pub struct SerialSink {
    bytes: RefCell<Vec<u8>>,
}

impl SerialSink {
    pub fn new() -> Self { Self::default() }

    pub fn text(&self) -> String { String::from_utf8(self.bytes.borrow().clone()).unwrap() }

    pub fn len(&self) -> usize { self.bytes.borrow().len() }
}

impl SerialTx for &SerialSink {
    fn transmit(
        &mut self,
        bytes: &[u8],
    ) {
        self.bytes.borrow_mut().extend_from_slice(bytes);
    }
}

/// Push bytes through the interrupt entry point, returning the last event.
pub fn feed(
    pipeline: &Pipeline<'_>,
    bytes: &[u8],
) -> CaptureEvent {
    bytes
        .iter()
        .fold(CaptureEvent::Ignored, |_, &b| pipeline.capture.on_byte_received(b))
}

/// Yield until `done` holds. Panics instead of hanging.
pub async fn wait_until(done: impl Fn() -> bool) {
    for _ in 0..10_000 {
        if done() {
            return;
        }
        yield_now().await;
    }
    panic!("condition not reached");
}

/// Occurrences of `needle` in `haystack`.
pub fn count(
    haystack: &str,
    needle: &str,
) -> usize {
    haystack.matches(needle).count()
}

/// Run the four pipeline tasks next to `script` until they all return.
///
/// Shutdown is requested once the script finishes, so a script that never
/// sends EXIT still terminates. Results are in the order extractor,
/// dispatcher, writer, menu producer.
pub fn run_session<'p, F>(
    pipeline: &Pipeline<'p>,
    led: &MockLed,
    clock: FixedClock,
    sink: &SerialSink,
    script: F,
) -> [Result<(), PipelineError>; 4]
where
    F: Future<Output = ()>,
{
    let tasks = join4(
        run_command_extractor(pipeline),
        Dispatcher::new(pipeline, led, clock).run(),
        run_writer(pipeline, sink),
        run_menu_producer(pipeline),
    );
    let script = async {
        script.await;
        pipeline.request_shutdown();
    };
    let ((extractor, dispatcher, writer, menu), ()) = block_on(join(tasks, script));
    [extractor, dispatcher, writer, menu]
}
