//! Semantic search over embedded chunks.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::Embedder;
use crate::orchestrator::Orchestrator;
use crate::store::LectureStore;

/// Embed the query and rank stored chunks by cosine similarity.
pub async fn run_search(
    query: &str,
    limit: usize,
    min_score: f32,
    settings: Settings,
) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Searching...");
    let query_embedding = orchestrator.embedder().embed(query).await?;
    let results = orchestrator
        .store()
        .search_chunks(&query_embedding, limit, min_score)
        .await?;
    spinner.finish_and_clear();

    if results.is_empty() {
        Output::info("No matching chunks found.");
        return Ok(());
    }

    for result in results {
        Output::search_result(
            &result.lecture_title,
            result.chunk.chunk_index,
            result.score,
            &result.chunk.content,
        );
    }

    Ok(())
}
