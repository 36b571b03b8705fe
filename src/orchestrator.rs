//! Pipeline orchestrator for Lectern.
//!
//! Coordinates chunking, embedding, and topic extraction for a lecture and
//! drives its processing status through `pending -> processing ->
//! completed | failed`.

use crate::chunking::chunk_transcript;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{LecternError, Result};
use crate::store::{ChunkRecord, Lecture, LectureStatus, LectureStore, SqliteLectureStore, TopicRecord};
use crate::topics::{OpenAITopicExtractor, TopicExtractor};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the Lectern pipeline.
pub struct Orchestrator {
    settings: Settings,
    embedder: Arc<dyn Embedder>,
    topic_extractor: Arc<dyn TopicExtractor>,
    store: Arc<dyn LectureStore>,
}

impl Orchestrator {
    /// Create a new orchestrator with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let topic_extractor = Arc::new(OpenAITopicExtractor::with_model(&settings.topics.model));

        let store = Arc::new(SqliteLectureStore::new(&settings.sqlite_path())?);

        Ok(Self {
            settings,
            embedder,
            topic_extractor,
            store,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        embedder: Arc<dyn Embedder>,
        topic_extractor: Arc<dyn TopicExtractor>,
        store: Arc<dyn LectureStore>,
    ) -> Self {
        Self {
            settings,
            embedder,
            topic_extractor,
            store,
        }
    }

    /// Get a reference to the lecture store.
    pub fn store(&self) -> Arc<dyn LectureStore> {
        self.store.clone()
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process a lecture: chunk, embed, extract topics, and finalize status.
    ///
    /// A missing lecture id is reported without mutating anything. Once the
    /// record is found the status flips to `processing` before any chunk or
    /// topic work, so observers see progress immediately. Any failure after
    /// that point marks the lecture `failed` with the failure message and is
    /// re-raised to the caller. Chunks persisted before a failure are left in
    /// place as a diagnostic artifact; re-invocation appends fresh rows rather
    /// than replacing them.
    #[instrument(skip(self), fields(lecture_id = %lecture_id))]
    pub async fn process_lecture(&self, lecture_id: &str) -> Result<ProcessOutcome> {
        let lecture = self
            .store
            .get_lecture(lecture_id)
            .await?
            .ok_or_else(|| LecternError::LectureNotFound(lecture_id.to_string()))?;

        info!("Processing lecture: {}", lecture_id);

        // No check of the prior status: re-invoking a completed lecture
        // re-processes it.
        self.store
            .set_status(lecture_id, LectureStatus::Processing)
            .await?;

        match self.run_pipeline(&lecture).await {
            Ok(outcome) => {
                self.store
                    .mark_completed(lecture_id, outcome.topic_count)
                    .await?;
                Ok(outcome)
            }
            Err(err) => {
                // Recording the failure is best-effort; the pipeline error is
                // what the caller needs to see.
                if let Err(store_err) = self.store.mark_failed(lecture_id, &err.to_string()).await {
                    warn!("Failed to record failure for {}: {}", lecture_id, store_err);
                }
                Err(err)
            }
        }
    }

    /// Run chunking, embedding, and topic extraction for a fetched lecture.
    async fn run_pipeline(&self, lecture: &Lecture) -> Result<ProcessOutcome> {
        let chunks = chunk_transcript(
            &lecture.transcript,
            self.settings.chunking.max_tokens_per_chunk,
        );
        info!("Created {} chunks", chunks.len());

        // Sequential on purpose: persisted chunk_index must match source
        // order, and each chunk lands in the store before the next call.
        for (index, chunk) in chunks.iter().enumerate() {
            let embedding = self.embedder.embed(&chunk.content).await?;
            let record = ChunkRecord::new(
                lecture.id.clone(),
                index as u32,
                chunk.content.clone(),
                chunk.token_count,
                Some(embedding),
            );
            self.store.insert_chunk(&record).await?;
        }

        let topics = self.topic_extractor.extract_topics(&lecture.transcript).await?;

        for (index, topic) in topics.iter().enumerate() {
            let record = TopicRecord::new(
                lecture.id.clone(),
                lecture.user_id.clone(),
                topic.title.clone(),
                topic.summary.clone(),
                index as u32,
            );
            self.store.insert_topic(&record).await?;
        }

        Ok(ProcessOutcome {
            lecture_id: lecture.id.clone(),
            chunks_processed: chunks.len(),
            topic_count: topics.len(),
        })
    }
}

/// Result of processing a lecture.
#[derive(Debug)]
pub struct ProcessOutcome {
    /// Lecture ID.
    pub lecture_id: String,
    /// Number of chunks embedded and persisted.
    pub chunks_processed: usize,
    /// Number of topics extracted and persisted.
    pub topic_count: usize,
}
