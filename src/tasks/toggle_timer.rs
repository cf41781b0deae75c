//! Toggle timer engine: flips the LED every period while armed.
//!
//! Runs as its own task so the dispatcher never waits on time. Arming with a
//! new period restarts the ticker, so re-arming a running toggle begins a fresh
//! period from now.

use core::future::pending;

use embassy_futures::select::{Either3, select3};
use embassy_time::Ticker;

use crate::error::PipelineError;
use crate::hal::Indicator;
use crate::pipeline::Pipeline;
use crate::{log_debug, log_info};

pub async fn run_toggle_timer<I: Indicator>(
    pipeline: &Pipeline<'_>,
    indicator: I,
) -> Result<(), PipelineError> {
    let mut shutdown = pipeline.shutdown.subscribe()?;
    let timer = &pipeline.toggle_timer;
    let mut ticker: Option<Ticker> = None;
    log_info!("Toggle timer engine started");

    loop {
        let expiry = async {
            match ticker.as_mut() {
                Some(ticker) => ticker.next().await,
                None => pending().await,
            }
        };
        let event = select3(shutdown.wait(), timer.next_control(), expiry).await;

        match event {
            Either3::First(()) => break,
            Either3::Second(control) => {
                log_debug!("Toggle timer {}", if control.period().is_some() { "armed" } else { "disarmed" });
                ticker = control.period().map(Ticker::every);
            }
            Either3::Third(()) => timer.fire(&indicator),
        }
    }

    log_info!("Toggle timer engine stopped after {} expiries", timer.expiries());
    Ok(())
}

// =============================================================================
// Unit Tests (host time driver)
// =============================================================================

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_time::{Duration, Timer};

    use super::*;
    use crate::command::CommandPool;
    use crate::testing::MockLed;
    use crate::toggle::PeriodicToggle;

    #[test]
    fn test_engine_toggles_while_armed() {
        let pool = CommandPool::new();
        let pipeline = Pipeline::new(&pool);
        let led = MockLed::new(false);
        let mut toggle = PeriodicToggle::new(&pipeline.toggle_timer, Duration::from_millis(5));

        let (result, ()) = block_on(join(run_toggle_timer(&pipeline, &led), async {
            Timer::after_millis(20).await;
            assert_eq!(pipeline.toggle_timer.expiries(), 0);

            toggle.start();
            Timer::after_millis(60).await;
            assert!(pipeline.toggle_timer.expiries() >= 3);

            toggle.stop();
            Timer::after_millis(1).await;
            let stopped_at = pipeline.toggle_timer.expiries();
            Timer::after_millis(30).await;
            assert_eq!(pipeline.toggle_timer.expiries(), stopped_at);

            pipeline.request_shutdown();
        }));

        assert_eq!(result, Ok(()));
        assert_eq!(led.writes(), pipeline.toggle_timer.expiries());
    }
}
