//! Task bodies for the command pipeline.
//!
//! Each runner is a plain `async fn` over a shared [`Pipeline`](crate::pipeline::Pipeline)
//! so it can be driven by the embassy executor on the board and by
//! `embassy_futures::block_on` in host tests:
//! - `extractor`: completed line -> [`Command`](crate::command::Command)
//! - `dispatcher`: command -> LED / toggle / clock action, optional reply
//! - `writer`: reply text -> UART
//! - `menu`: menu banner on start and after every line
//! - `toggle_timer`: periodic LED flip while the toggle is armed
//!
//! Every runner subscribes to the shutdown broadcast first and returns `Ok(())`
//! once it fires.

pub mod dispatcher;
pub mod extractor;
pub mod menu;
pub mod toggle_timer;
pub mod writer;

pub use dispatcher::{Dispatched, Dispatcher};
pub use extractor::{extract_command, run_command_extractor};
pub use menu::run_menu_producer;
pub use toggle_timer::run_toggle_timer;
pub use writer::run_writer;

// =============================================================================
// End-to-end Tests (all four runners against one pipeline)
// =============================================================================

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use crate::capture::CaptureEvent;
    use crate::clock::DateTime;
    use crate::command::CommandPool;
    use crate::config::{INVALID_COMMAND_MSG, MENU};
    use crate::hal::Indicator;
    use crate::pipeline::Pipeline;
    use crate::testing::{FixedClock, MockLed, SerialSink, count, feed, run_session, wait_until};

    const CLOCK: FixedClock = FixedClock(DateTime {
        hours: 10,
        minutes: 0,
        seconds: 0,
        day: 1,
        month: 1,
        year: 25,
    });
    const STATUS_OFF: &str = "\r\nEl estado del LED es: 0\r\n";
    const STATUS_ON: &str = "\r\nEl estado del LED es: 1\r\n";

    fn all_ok(results: [Result<(), crate::error::PipelineError>; 4]) -> bool { results.iter().all(Result::is_ok) }

    #[test]
    fn test_led_on_reemits_menu_only() {
        let pool = CommandPool::new();
        let pipeline = Pipeline::new(&pool);
        let led = MockLed::new(false);
        let sink = SerialSink::new();

        let results = run_session(&pipeline, &led, CLOCK, &sink, async {
            wait_until(|| count(&sink.text(), MENU) == 1).await;
            feed(&pipeline, b"1\r");
            wait_until(|| led.is_on() && count(&sink.text(), MENU) == 2).await;
        });

        assert!(all_ok(results));
        assert!(led.is_on());
        assert_eq!(sink.text(), [MENU, MENU].concat());
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_read_status_reply() {
        let pool = CommandPool::new();
        let pipeline = Pipeline::new(&pool);
        let led = MockLed::new(false);
        let sink = SerialSink::new();

        let results = run_session(&pipeline, &led, CLOCK, &sink, async {
            wait_until(|| sink.len() == MENU.len()).await;
            feed(&pipeline, b"5\r");
            wait_until(|| sink.len() == 2 * MENU.len() + STATUS_OFF.len()).await;
        });

        assert!(all_ok(results));
        let text = sink.text();
        assert!(text.starts_with(MENU));
        assert_eq!(count(&text, STATUS_OFF), 1);
        assert_eq!(count(&text, MENU), 2);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_read_status_follows_led_on() {
        let pool = CommandPool::new();
        let pipeline = Pipeline::new(&pool);
        let led = MockLed::new(false);
        let sink = SerialSink::new();

        let results = run_session(&pipeline, &led, CLOCK, &sink, async {
            wait_until(|| sink.len() == MENU.len()).await;
            feed(&pipeline, b"1\r");
            wait_until(|| led.is_on()).await;
            feed(&pipeline, b"5\r");
            wait_until(|| sink.text().contains(STATUS_ON)).await;
        });

        assert!(all_ok(results));
        let text = sink.text();
        assert_eq!(count(&text, STATUS_ON), 1);
        assert_eq!(count(&text, STATUS_OFF), 0);
        assert!(led.is_on());
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_pasted_burst_keeps_every_command() {
        let pool = CommandPool::new();
        let pipeline = Pipeline::new(&pool);
        let led = MockLed::new(false);
        let sink = SerialSink::new();

        let results = run_session(&pipeline, &led, CLOCK, &sink, async {
            feed(&pipeline, b"1\r5\r2\r5\r");
            wait_until(|| pool.allocated_total() == 4 && pool.in_use() == 0 && pipeline.writer.is_empty()).await;
        });

        assert!(all_ok(results));
        let text = sink.text();
        let on = text.find(STATUS_ON).unwrap();
        let off = text.find(STATUS_OFF).unwrap();
        assert!(on < off);
        assert!(!led.is_on());
        assert_eq!(led.writes(), 2);
        assert_eq!(pipeline.capture.stats().dropped_lines, 0);
    }

    #[test]
    fn test_unknown_digit_reply() {
        let pool = CommandPool::new();
        let pipeline = Pipeline::new(&pool);
        let led = MockLed::new(true);
        let sink = SerialSink::new();

        let results = run_session(&pipeline, &led, CLOCK, &sink, async {
            wait_until(|| sink.len() == MENU.len()).await;
            feed(&pipeline, b"9\r");
            wait_until(|| sink.len() == 2 * MENU.len() + INVALID_COMMAND_MSG.len()).await;
        });

        assert!(all_ok(results));
        assert_eq!(count(&sink.text(), INVALID_COMMAND_MSG), 1);
        assert!(led.is_on());
        assert_eq!(led.writes(), 0);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_exit_stops_everything() {
        let pool = CommandPool::new();
        let pipeline = Pipeline::new(&pool);
        let led = MockLed::new(false);
        let sink = SerialSink::new();

        let results = run_session(&pipeline, &led, CLOCK, &sink, async {
            wait_until(|| sink.len() == MENU.len()).await;
            feed(&pipeline, b"3\r");
            wait_until(|| pipeline.toggle_timer.is_armed()).await;
            feed(&pipeline, b"0\r");
            wait_until(|| pipeline.shutdown.is_requested()).await;
        });

        assert!(all_ok(results));
        assert_eq!(pipeline.shutdown.live_tasks(), 0);
        block_on(pipeline.shutdown.wait_all_stopped());
        assert!(!pipeline.toggle_timer.is_armed());

        // Input after EXIT goes nowhere
        let written = sink.len();
        assert!(!pipeline.capture.is_enabled());
        assert_eq!(feed(&pipeline, b"1\r"), CaptureEvent::Ignored);
        assert!(pipeline.commands.is_empty());
        assert_eq!(pool.in_use(), 0);
        assert_eq!(sink.len(), written);
        assert!(!led.is_on());
    }

    #[test]
    fn test_replies_keep_submission_order() {
        let pool = CommandPool::new();
        let pipeline = Pipeline::new(&pool);
        let led = MockLed::new(false);
        let sink = SerialSink::new();

        let results = run_session(&pipeline, &led, CLOCK, &sink, async {
            // Both lines complete before any task runs
            feed(&pipeline, b"5\r9\r");
            wait_until(|| {
                let text = sink.text();
                text.contains(STATUS_OFF) && text.contains(INVALID_COMMAND_MSG)
            })
            .await;
        });

        assert!(all_ok(results));
        let text = sink.text();
        let status = text.find(STATUS_OFF).unwrap();
        let invalid = text.find(INVALID_COMMAND_MSG).unwrap();
        assert!(status < invalid);
        assert_eq!(pool.allocated_total(), 2);
        assert_eq!(pool.in_use(), 0);
    }
}
