//! List lectures and their processing status.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::store::LectureStore;

/// Print all lectures with status and topic counts.
pub async fn run_list(settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let lectures = orchestrator.store().list_lectures().await?;

    if lectures.is_empty() {
        Output::info("No lectures yet. Add one with `lectern add`.");
        return Ok(());
    }

    Output::header(&format!("Lectures ({})", lectures.len()));
    for lecture in lectures {
        Output::lecture_info(
            &lecture.title,
            &lecture.id,
            &lecture.status.to_string(),
            lecture.topic_count,
        );
    }

    Ok(())
}
