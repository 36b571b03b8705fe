//! Show one lecture's status and extracted topics.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::LecternError;
use crate::orchestrator::Orchestrator;
use crate::store::LectureStore;

/// Print a lecture's status, error (if any), chunk count, and topics.
pub async fn run_show(lecture_id: &str, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let store = orchestrator.store();

    let lecture = store
        .get_lecture(lecture_id)
        .await?
        .ok_or_else(|| LecternError::LectureNotFound(lecture_id.to_string()))?;

    Output::header(&lecture.title);
    Output::kv("ID", &lecture.id);
    Output::kv("Status", &lecture.status.to_string());
    if let Some(error) = &lecture.processing_error {
        Output::kv("Error", error);
    }
    if let Some(processed_at) = &lecture.processed_at {
        Output::kv("Processed", &processed_at.to_rfc3339());
    }

    let chunks = store.chunks_for_lecture(&lecture.id).await?;
    Output::kv("Chunks", &chunks.len().to_string());

    let topics = store.topics_for_lecture(&lecture.id).await?;
    if !topics.is_empty() {
        Output::header("Topics");
        for topic in topics {
            println!(
                "  {}. {}",
                topic.order_index + 1,
                console::style(&topic.title).bold()
            );
            println!("     {}", topic.summary);
        }
    }

    Ok(())
}
