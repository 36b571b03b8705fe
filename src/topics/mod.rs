//! Topic extraction from lecture transcripts.
//!
//! Derives an ordered outline of the subjects a lecture covers, each with a
//! title and a multi-sentence summary.

mod openai;

pub use openai::OpenAITopicExtractor;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single topic extracted from a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedTopic {
    /// Short topic title.
    pub title: String,
    /// Multi-sentence summary of the topic.
    pub summary: String,
}

/// Trait for topic extraction implementations.
#[async_trait]
pub trait TopicExtractor: Send + Sync {
    /// Extract an ordered list of topics from a transcript.
    ///
    /// The returned order is significant and is preserved when topics are
    /// persisted.
    async fn extract_topics(&self, transcript: &str) -> Result<Vec<ExtractedTopic>>;
}
