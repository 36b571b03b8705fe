//! Run the processing pipeline for one lecture.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;

/// Invoke the pipeline for a lecture ID.
pub async fn run_process(lecture_id: &str, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Processing lecture {}...", lecture_id));
    let result = orchestrator.process_lecture(lecture_id).await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => {
            Output::success(&format!(
                "Processed lecture {}: {} chunks embedded, {} topics extracted",
                outcome.lecture_id, outcome.chunks_processed, outcome.topic_count
            ));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Processing failed: {}", e));
            Err(e.into())
        }
    }
}
