//! Pipeline configuration constants.
//!
//! # Sizing
//!
//! Every buffer in the pipeline is statically sized. The constants below are the
//! single place to change queue depths, line length or response size; the queues,
//! the command pool and the shutdown broadcast are all derived from them.

use embassy_time::Duration;

use crate::clock::DateTime;

// =============================================================================
// Serial Line
// =============================================================================

/// Byte that completes an input line (the terminal's Enter key).
pub const LINE_TERMINATOR: u8 = b'\r';

/// Maximum bytes held for one input line, terminator excluded.
/// Bytes past this are dropped and the line is flagged as overrun.
pub const LINE_CAPACITY: usize = 20;

/// UART baud rate (8N1, no flow control).
pub const UART_BAUD_RATE: u32 = 115_200;

// =============================================================================
// Queues and Records
// =============================================================================

/// Reserved argument bytes carried by every command. Always zero today.
pub const COMMAND_ARGS_LEN: usize = 10;

/// Depth of the extractor -> dispatcher queue.
pub const COMMAND_QUEUE_DEPTH: usize = 10;

/// Depth of the (menu, dispatcher) -> writer queue.
pub const WRITER_QUEUE_DEPTH: usize = 10;

/// Finished lines the interrupt can hold before the extractor runs.
/// Matches the command queue so a pasted burst that fits the queue is kept.
pub const PENDING_LINES: usize = COMMAND_QUEUE_DEPTH;

/// Live command records at once: a full queue, one being built by the
/// extractor and one being executed by the dispatcher.
pub const COMMAND_POOL_SIZE: usize = COMMAND_QUEUE_DEPTH + 2;

/// Capacity of a formatted response (bytes, UTF-8).
pub const RESPONSE_CAPACITY: usize = 64;

// =============================================================================
// Tasks
// =============================================================================

/// Pipeline tasks: menu producer, command extractor, dispatcher, writer.
pub const PIPELINE_TASKS: usize = 4;

/// Shutdown subscribers: the pipeline tasks plus the toggle timer engine.
pub const SHUTDOWN_RECEIVERS: usize = PIPELINE_TASKS + 1;

/// Period of the LED toggle timer.
pub const TOGGLE_PERIOD: Duration = Duration::from_millis(500);

// =============================================================================
// Clock
// =============================================================================

/// Calendar time the soft RTC reports at power-on.
pub const CLOCK_EPOCH: DateTime = DateTime {
    hours: 0,
    minutes: 0,
    seconds: 0,
    day: 1,
    month: 1,
    year: 25,
};

// =============================================================================
// Text
// =============================================================================

/// Printed once, directly on the UART, before the pipeline starts.
pub const BOOT_BANNER: &str = "\r\nEsta es la Demo de 'Queue Processing'\r\n";

/// Menu re-sent after every completed input line.
pub const MENU: &str = "\r\nLED_ON             ----> 1 \
                        \r\nLED_OFF            ----> 2 \
                        \r\nLED_TOGGLE         ----> 3 \
                        \r\nLED_TOGGLE_OFF     ----> 4 \
                        \r\nLED_READ_STATUS    ----> 5 \
                        \r\nRTC_PRINT_DATETIME ----> 6 \
                        \r\nEXIT_APP           ----> 0 \
                        \r\nEscribe tu opción aquí : ";

/// Response for any input that is not a known command.
pub const INVALID_COMMAND_MSG: &str = "\r\nComando inválido recibido.\r\n";
