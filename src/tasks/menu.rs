//! Menu producer: shows the menu at start and after every completed line.

use crate::error::PipelineError;
use crate::log_info;
use crate::pipeline::Pipeline;
use crate::response::ResponseText;

pub async fn run_menu_producer(pipeline: &Pipeline<'_>) -> Result<(), PipelineError> {
    let mut shutdown = pipeline.shutdown.subscribe()?;
    log_info!("Menu producer started");

    loop {
        if shutdown.run_until(pipeline.writer.send(ResponseText::menu())).await.is_none() {
            break;
        }
        if shutdown.run_until(pipeline.capture.wait_menu_request()).await.is_none() {
            break;
        }
    }

    log_info!("Menu producer stopped");
    Ok(())
}
