//! Writer: the only task that touches the UART transmitter.

use crate::error::PipelineError;
use crate::hal::SerialTx;
use crate::log_info;
use crate::pipeline::Pipeline;

/// Runner: dequeue text and transmit it whole before taking the next one.
///
/// The record is owned for the duration of the transmit and dropped after.
pub async fn run_writer<T: SerialTx>(
    pipeline: &Pipeline<'_>,
    mut tx: T,
) -> Result<(), PipelineError> {
    let mut shutdown = pipeline.shutdown.subscribe()?;
    log_info!("Writer started");

    while let Some(text) = shutdown.run_until(pipeline.writer.receive()).await {
        tx.transmit(text.as_bytes());
    }

    log_info!("Writer stopped");
    Ok(())
}
