//! Command dispatcher: runs the action for each queued command.
//!
//! | code | action                     | reply            |
//! |------|----------------------------|------------------|
//! | 1    | LED on                     | -                |
//! | 2    | LED off                    | -                |
//! | 3    | start periodic toggle      | -                |
//! | 4    | stop periodic toggle       | -                |
//! | 5    | read LED                   | LED status       |
//! | 6    | read clock                 | date and time    |
//! | 0    | shut the pipeline down     | -                |
//! | else | -                          | invalid command  |
//!
//! The command is consumed by [`Dispatcher::dispatch`]; whichever arm runs, it
//! is dropped once when the call returns and its pool slot is released.

use crate::command::{Command, CommandCode};
use crate::config::TOGGLE_PERIOD;
use crate::cpu_cycles;
use crate::error::PipelineError;
use crate::hal::{Clock, Indicator};
use crate::pipeline::Pipeline;
use crate::response::ResponseText;
use crate::toggle::{PeriodicToggle, ToggleState};
use crate::{log_debug, log_info, log_warn};

/// Result of dispatching one command.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatched {
    /// Action done, nothing to report.
    Done,
    /// Action done, send this to the writer.
    Reply(ResponseText),
    /// EXIT: shutdown has been requested.
    Exit,
}

/// Owns the LED, the clock and the toggle state machine.
pub struct Dispatcher<'a, 'p, I, C> {
    pipeline: &'a Pipeline<'p>,
    indicator: I,
    clock: C,
    toggle: PeriodicToggle<'a>,
}

impl<'a, 'p, I: Indicator, C: Clock> Dispatcher<'a, 'p, I, C> {
    pub fn new(
        pipeline: &'a Pipeline<'p>,
        indicator: I,
        clock: C,
    ) -> Self {
        Self {
            pipeline,
            indicator,
            clock,
            toggle: PeriodicToggle::new(&pipeline.toggle_timer, TOGGLE_PERIOD),
        }
    }

    #[inline]
    pub const fn toggle_state(&self) -> ToggleState { self.toggle.state() }

    /// Execute one command.
    ///
    /// Only a reply that cannot be formatted is an error.
    pub fn dispatch(
        &mut self,
        command: Command<'p>,
    ) -> Result<Dispatched, PipelineError> {
        let start = cpu_cycles::read();
        let code = command.code();

        let outcome = match code {
            CommandCode::LedOn => {
                self.indicator.set(true);
                Dispatched::Done
            }
            CommandCode::LedOff => {
                self.indicator.set(false);
                Dispatched::Done
            }
            CommandCode::ToggleStart => {
                self.toggle.start();
                Dispatched::Done
            }
            CommandCode::ToggleStop => {
                if !self.toggle.stop() {
                    log_debug!("Toggle stop ignored, state {}", self.toggle.state());
                }
                Dispatched::Done
            }
            CommandCode::ReadStatus => Dispatched::Reply(ResponseText::led_status(self.indicator.is_on())?),
            CommandCode::ReadClock => Dispatched::Reply(ResponseText::clock_report(self.clock.now())?),
            CommandCode::Exit => {
                self.toggle.stop();
                self.pipeline.request_shutdown();
                Dispatched::Exit
            }
            CommandCode::Invalid(raw) => {
                log_warn!("Invalid command {}", raw);
                Dispatched::Reply(ResponseText::invalid_command())
            }
        };
        drop(command);

        let cycles = cpu_cycles::elapsed(start, cpu_cycles::read());
        log_debug!("Command {} took {} cycles ({} us)", code, cycles, cpu_cycles::cycles_to_micros(cycles));
        Ok(outcome)
    }

    /// Runner: dequeue, dispatch, forward replies. Returns after EXIT.
    pub async fn run(mut self) -> Result<(), PipelineError> {
        let mut shutdown = self.pipeline.shutdown.subscribe()?;
        log_info!("Command dispatcher started");

        while let Some(command) = shutdown.run_until(self.pipeline.commands.receive()).await {
            match self.dispatch(command)? {
                Dispatched::Done => {}
                Dispatched::Reply(text) => {
                    if shutdown.run_until(self.pipeline.writer.send(text)).await.is_none() {
                        break;
                    }
                }
                Dispatched::Exit => break,
            }
        }

        log_info!("Command dispatcher stopped");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
