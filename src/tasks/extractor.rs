//! Command extractor: turns each completed line into a queued [`Command`].

use crate::capture::{CaptureStats, CapturedLine};
use crate::command::{Command, CommandCode};
use crate::config::LINE_TERMINATOR;
use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::{log_debug, log_info, log_warn};

/// Decode a line from its first byte.
///
/// An empty line decodes the terminator itself, which is never a valid code.
/// An overrun line is rejected whatever it starts with.
fn decode_line(line: &CapturedLine) -> CommandCode {
    let code = CommandCode::from_ascii(line.first_byte().unwrap_or(LINE_TERMINATOR));
    if line.overrun() { CommandCode::Invalid(code.raw()) } else { code }
}

/// Argument extraction hook. No command takes arguments yet.
fn extract_args(
    _line: &CapturedLine,
    _args: &mut [u8],
) {
}

/// Build a command from the oldest pending line.
///
/// The command is allocated first, then the oldest pending line is read and
/// consumed inside the capture's critical section. `Ok(None)` means no line was
/// pending; the blank command goes straight back to the pool.
pub fn extract_command<'p>(pipeline: &Pipeline<'p>) -> Result<Option<Command<'p>>, PipelineError> {
    let mut command = pipeline.pool().allocate()?;

    let taken = pipeline.capture.take_line_with(|line| {
        extract_args(line, command.args_mut());
        (decode_line(line), line.overrun())
    });
    let Some((code, overrun)) = taken else {
        log_debug!("No pending line to extract");
        return Ok(None);
    };

    if overrun {
        log_warn!("Input line overrun, command rejected");
    }
    command.set_code(code);
    Ok(Some(command))
}

/// Runner: wait for a line, then extract and queue every pending line in
/// completion order. Waits while the queue is full.
pub async fn run_command_extractor(pipeline: &Pipeline<'_>) -> Result<(), PipelineError> {
    let mut shutdown = pipeline.shutdown.subscribe()?;
    log_info!("Command extractor started");

    let mut seen = CaptureStats::default();
    'wakes: loop {
        if shutdown.run_until(pipeline.capture.wait_line()).await.is_none() {
            break;
        }

        let stats = pipeline.capture.stats();
        let dropped = stats.dropped_lines.wrapping_sub(seen.dropped_lines);
        if dropped > 0 {
            log_warn!("{} input lines dropped, pending FIFO full", dropped);
        }
        if stats.dropped_bytes != seen.dropped_bytes {
            log_debug!("{} bytes dropped on overrun since boot", stats.dropped_bytes);
        }
        seen = stats;

        // Wakes coalesce: one wake may stand for several lines
        while pipeline.capture.pending_lines() > 0 {
            let Some(command) = extract_command(pipeline)? else {
                break;
            };
            log_debug!("Extracted command {}", command.code());

            // Dropping the send on shutdown drops the command with it
            if shutdown.run_until(pipeline.commands.send(command)).await.is_none() {
                break 'wakes;
            }
        }
    }

    log_info!("Command extractor stopped");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
