//! Add a lecture transcript to the store.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::LecternError;
use crate::orchestrator::Orchestrator;
use crate::store::{Lecture, LectureStore};
use std::io::Read;

/// Create a pending lecture from a transcript file (or stdin) and optionally
/// process it immediately.
pub async fn run_add(
    input: &str,
    title: &str,
    user: &str,
    process: bool,
    settings: Settings,
) -> anyhow::Result<()> {
    if title.trim().is_empty() {
        return Err(LecternError::InvalidInput("Lecture title must not be empty".to_string()).into());
    }

    let transcript = read_transcript(input)?;

    let orchestrator = Orchestrator::new(settings)?;
    let store = orchestrator.store();

    let lecture = Lecture::new(user.to_string(), title.to_string(), transcript);
    store.create_lecture(&lecture).await?;

    Output::success(&format!("Added lecture {} ({})", lecture.id, title));

    if process {
        let spinner = Output::spinner("Processing lecture...");
        let result = orchestrator.process_lecture(&lecture.id).await;
        spinner.finish_and_clear();

        let outcome = result?;
        Output::success(&format!(
            "Processed: {} chunks embedded, {} topics extracted",
            outcome.chunks_processed, outcome.topic_count
        ));
    } else {
        Output::info(&format!("Run `lectern process {}` to process it.", lecture.id));
    }

    Ok(())
}

fn read_transcript(input: &str) -> Result<String, LecternError> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}
