//! LLM-based topic extraction implementation.
//!
//! Sends a bounded transcript prefix to a chat model with a strict JSON
//! schema response format and parses the returned topic list.

use super::{ExtractedTopic, TopicExtractor};
use crate::error::{LecternError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

/// Maximum number of transcript characters sent to the model.
///
/// Long transcripts are truncated to this prefix as a cost/latency control;
/// topics are derived from the prefix only.
const MAX_PROMPT_CHARS: usize = 8000;

/// LLM-based topic extractor.
pub struct OpenAITopicExtractor {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAITopicExtractor {
    pub fn new() -> Self {
        Self::with_model("gpt-4o-mini")
    }

    pub fn with_model(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }

    /// Build the extraction prompt from a transcript, truncated to the
    /// bounded prefix.
    fn build_prompt(transcript: &str) -> String {
        let excerpt: String = transcript.chars().take(MAX_PROMPT_CHARS).collect();
        format!(
            "Analyze this lecture transcript and extract 5-8 main topics.\n\
             Return ONLY a valid JSON object with this exact structure:\n\
             {{\"topics\": [{{\"title\": \"Topic Name\", \"summary\": \"5-8 sentence in depth summary\"}}]}}\n\
             \n\
             Transcript:\n\
             {}",
            excerpt
        )
    }

    /// JSON schema the model response must conform to.
    fn response_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "topics": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "summary": { "type": "string" }
                        },
                        "required": ["title", "summary"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["topics"],
            "additionalProperties": false
        })
    }
}

impl Default for OpenAITopicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct TopicResponse {
    topics: Vec<ExtractedTopic>,
}

#[async_trait]
impl TopicExtractor for OpenAITopicExtractor {
    #[instrument(skip(self, transcript), fields(transcript_chars = transcript.len()))]
    async fn extract_topics(&self, transcript: &str) -> Result<Vec<ExtractedTopic>> {
        let prompt = Self::build_prompt(transcript);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| LecternError::TopicExtraction(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.3)
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    name: "topic_extraction".to_string(),
                    description: Some("Extract main topics from lecture transcript".to_string()),
                    schema: Some(Self::response_schema()),
                    strict: Some(true),
                },
            })
            .build()
            .map_err(|e| LecternError::TopicExtraction(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            LecternError::OpenAI(format!("Topic extraction request failed: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| LecternError::TopicExtraction("Empty response from model".to_string()))?;

        debug!("Topic extraction response: {}", &content[..content.len().min(500)]);

        let parsed: TopicResponse = serde_json::from_str(content).map_err(|e| {
            LecternError::TopicExtraction(format!(
                "Failed to parse topic response: {}. Response was: {}",
                e,
                &content[..content.len().min(500)]
            ))
        })?;

        // The request asks for 5-8 topics but the count is not re-validated
        // here; whatever the model returned is persisted as-is.
        info!("Extracted {} topics", parsed.topics.len());
        Ok(parsed.topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_truncates_long_transcripts() {
        let transcript = "x".repeat(20_000);
        let prompt = OpenAITopicExtractor::build_prompt(&transcript);
        let excerpt_len = prompt.split("Transcript:\n").nth(1).unwrap().len();
        assert_eq!(excerpt_len, MAX_PROMPT_CHARS);
    }

    #[test]
    fn test_prompt_keeps_short_transcripts_whole() {
        let prompt = OpenAITopicExtractor::build_prompt("short transcript");
        assert!(prompt.ends_with("short transcript"));
        assert!(prompt.contains("extract 5-8 main topics"));
    }

    #[test]
    fn test_topic_response_parsing() {
        let json = r#"{"topics": [
            {"title": "Introduction", "summary": "Opening remarks."},
            {"title": "Main Argument", "summary": "The core claim."}
        ]}"#;

        let parsed: TopicResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.topics.len(), 2);
        assert_eq!(parsed.topics[0].title, "Introduction");
        assert_eq!(parsed.topics[1].summary, "The core claim.");
    }

    #[test]
    fn test_topic_response_rejects_wrong_shape() {
        let json = r#"{"sections": [{"title": "Nope"}]}"#;
        assert!(serde_json::from_str::<TopicResponse>(json).is_err());
    }

    #[test]
    fn test_response_schema_shape() {
        let schema = OpenAITopicExtractor::response_schema();
        assert_eq!(schema["required"][0], "topics");
        assert_eq!(
            schema["properties"]["topics"]["items"]["required"],
            serde_json::json!(["title", "summary"])
        );
    }
}
