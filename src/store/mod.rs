//! Lecture storage abstraction.
//!
//! Provides a trait-based interface over the persisted record shapes:
//! lectures, their embedded chunks, and their extracted topics.

mod sqlite;

pub use sqlite::SqliteLectureStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Processing status of a lecture.
///
/// Lifecycle: `pending -> processing -> completed | failed`. The two final
/// states are terminal in that nothing retries automatically, but a new
/// invocation re-enters `processing` regardless of the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LectureStatus {
    /// Created, not yet picked up by the pipeline.
    Pending,
    /// Pipeline run in progress.
    Processing,
    /// Chunks and topics persisted.
    Completed,
    /// Pipeline aborted; see `processing_error`.
    Failed,
}

impl std::str::FromStr for LectureStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(LectureStatus::Pending),
            "processing" => Ok(LectureStatus::Processing),
            "completed" => Ok(LectureStatus::Completed),
            "failed" => Ok(LectureStatus::Failed),
            _ => Err(format!("Unknown lecture status: {}", s)),
        }
    }
}

impl std::fmt::Display for LectureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LectureStatus::Pending => write!(f, "pending"),
            LectureStatus::Processing => write!(f, "processing"),
            LectureStatus::Completed => write!(f, "completed"),
            LectureStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One transcript submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    /// Opaque unique ID.
    pub id: String,
    /// Submitting user.
    pub user_id: String,
    /// Lecture title.
    pub title: String,
    /// Full transcript text.
    pub transcript: String,
    /// Current pipeline status.
    pub status: LectureStatus,
    /// Failure message from the last run, if it failed.
    pub processing_error: Option<String>,
    /// When processing last completed.
    pub processed_at: Option<DateTime<Utc>>,
    /// Number of topics persisted on completion.
    pub topic_count: Option<u32>,
    /// When the lecture was created.
    pub created_at: DateTime<Utc>,
}

impl Lecture {
    /// Create a new pending lecture.
    pub fn new(user_id: String, title: String, transcript: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            title,
            transcript,
            status: LectureStatus::Pending,
            processing_error: None,
            processed_at: None,
            topic_count: None,
            created_at: Utc::now(),
        }
    }
}

/// One embedded segment of a lecture transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique row ID.
    pub id: Uuid,
    /// Owning lecture.
    pub lecture_id: String,
    /// Zero-based position within the run that produced this chunk.
    pub chunk_index: u32,
    /// Text content.
    pub content: String,
    /// Estimated token count.
    pub token_count: u32,
    /// Embedding vector, absent until computed.
    pub embedding: Option<Vec<f32>>,
    /// When this chunk was persisted.
    pub created_at: DateTime<Utc>,
}

impl ChunkRecord {
    /// Create a new chunk record.
    pub fn new(
        lecture_id: String,
        chunk_index: u32,
        content: String,
        token_count: u32,
        embedding: Option<Vec<f32>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            lecture_id,
            chunk_index,
            content,
            token_count,
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// One extracted topic within a lecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRecord {
    /// Unique row ID.
    pub id: Uuid,
    /// Owning lecture.
    pub lecture_id: String,
    /// Owning user.
    pub user_id: String,
    /// Topic title.
    pub title: String,
    /// Topic summary.
    pub summary: String,
    /// Zero-based extraction order.
    pub order_index: u32,
    /// Reserved for hierarchical grouping; the pipeline never sets it.
    pub parent_topic_id: Option<String>,
    /// When this topic was persisted.
    pub created_at: DateTime<Utc>,
}

impl TopicRecord {
    /// Create a new flat (parentless) topic record.
    pub fn new(
        lecture_id: String,
        user_id: String,
        title: String,
        summary: String,
        order_index: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            lecture_id,
            user_id,
            title,
            summary,
            order_index,
            parent_topic_id: None,
            created_at: Utc::now(),
        }
    }
}

/// A chunk matched by semantic search.
#[derive(Debug, Clone)]
pub struct ChunkSearchResult {
    /// The matched chunk.
    pub chunk: ChunkRecord,
    /// Title of the owning lecture.
    pub lecture_title: String,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for lecture store implementations.
#[async_trait]
pub trait LectureStore: Send + Sync {
    /// Persist a new lecture record.
    async fn create_lecture(&self, lecture: &Lecture) -> Result<()>;

    /// Fetch a lecture by ID.
    async fn get_lecture(&self, id: &str) -> Result<Option<Lecture>>;

    /// List all lectures, newest first.
    async fn list_lectures(&self) -> Result<Vec<Lecture>>;

    /// Set a lecture's processing status.
    async fn set_status(&self, id: &str, status: LectureStatus) -> Result<()>;

    /// Mark a lecture completed: status, processed-at timestamp, topic count.
    async fn mark_completed(&self, id: &str, topic_count: usize) -> Result<()>;

    /// Mark a lecture failed with a human-readable message.
    async fn mark_failed(&self, id: &str, message: &str) -> Result<()>;

    /// Append a chunk row. Rows from earlier runs are never replaced.
    async fn insert_chunk(&self, chunk: &ChunkRecord) -> Result<()>;

    /// All chunk rows for a lecture in index order (insertion order within
    /// equal indices, so repeated runs list their duplicates together).
    async fn chunks_for_lecture(&self, lecture_id: &str) -> Result<Vec<ChunkRecord>>;

    /// Append a topic row.
    async fn insert_topic(&self, topic: &TopicRecord) -> Result<()>;

    /// All topic rows for a lecture in extraction order.
    async fn topics_for_lecture(&self, lecture_id: &str) -> Result<Vec<TopicRecord>>;

    /// Rank embedded chunks across all lectures by cosine similarity.
    async fn search_chunks(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<ChunkSearchResult>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            LectureStatus::Pending,
            LectureStatus::Processing,
            LectureStatus::Completed,
            LectureStatus::Failed,
        ] {
            let parsed: LectureStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }

        assert!("archived".parse::<LectureStatus>().is_err());
    }

    #[test]
    fn test_new_lecture_is_pending() {
        let lecture = Lecture::new(
            "user-1".to_string(),
            "Intro to Rust".to_string(),
            "Ownership is the headline feature.".to_string(),
        );

        assert_eq!(lecture.status, LectureStatus::Pending);
        assert!(lecture.processing_error.is_none());
        assert!(lecture.processed_at.is_none());
        assert!(lecture.topic_count.is_none());
    }

    #[test]
    fn test_new_topic_is_flat() {
        let topic = TopicRecord::new(
            "lec-1".to_string(),
            "user-1".to_string(),
            "Borrowing".to_string(),
            "References without ownership transfer.".to_string(),
            0,
        );

        assert!(topic.parent_topic_id.is_none());
    }
}
