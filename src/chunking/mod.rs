//! Transcript chunking for breaking lectures into embeddable segments.
//!
//! Splits raw transcript text on paragraph boundaries and greedily packs
//! paragraphs into token-bounded chunks.

use serde::{Deserialize, Serialize};

/// Default token budget per chunk.
pub const DEFAULT_MAX_TOKENS_PER_CHUNK: u32 = 500;

/// A chunk of transcript text ready for embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Estimated token count of the content.
    pub token_count: u32,
}

/// Estimate the token count of a piece of text.
///
/// Uses the rough 4-characters-per-token heuristic. This is a cheap proxy,
/// not a real tokenizer; only monotonicity with text length matters here.
pub fn estimate_tokens(text: &str) -> u32 {
    (text.chars().count() as u32).div_ceil(4)
}

/// Split a transcript into token-bounded chunks along paragraph boundaries.
///
/// Paragraphs (separated by one or more blank lines) are accumulated greedily:
/// when adding the next paragraph would push the running token estimate past
/// `max_tokens_per_chunk` and the current chunk already holds content, the
/// current chunk is closed and a new one starts with that paragraph. A single
/// paragraph larger than the budget is kept whole in its own chunk rather
/// than split further.
///
/// Deterministic and pure; empty input yields no chunks.
pub fn chunk_transcript(text: &str, max_tokens_per_chunk: u32) -> Vec<TranscriptChunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_tokens: u32 = 0;

    for paragraph in split_paragraphs(text) {
        let paragraph_tokens = estimate_tokens(paragraph);

        if current_tokens + paragraph_tokens > max_tokens_per_chunk && !current.is_empty() {
            chunks.push(TranscriptChunk {
                content: current.trim().to_string(),
                token_count: current_tokens,
            });
            current = paragraph.to_string();
            current_tokens = paragraph_tokens;
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(paragraph);
            current_tokens += paragraph_tokens;
        }
    }

    if !current.is_empty() {
        chunks.push(TranscriptChunk {
            content: current.trim().to_string(),
            token_count: current_tokens,
        });
    }

    chunks
}

/// Split text into paragraphs on runs of blank lines, skipping empty segments.
fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n")
        .map(|part| part.trim_matches('\n'))
        .filter(|part| !part.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk_transcript("", 500).is_empty());
    }

    #[test]
    fn test_whitespace_only_input_yields_no_chunks() {
        assert!(chunk_transcript("\n\n\n\n", 500).is_empty());
    }

    #[test]
    fn test_single_paragraph_single_chunk() {
        let chunks = chunk_transcript("Hello world, this is a lecture.", 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world, this is a lecture.");
        assert_eq!(chunks[0].token_count, 8); // ceil(31 / 4)
    }

    #[test]
    fn test_oversized_paragraph_is_not_split() {
        // 3000 chars => 750 estimated tokens, well past a 500 budget
        let text = "a".repeat(3000);
        let chunks = chunk_transcript(&text, 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].token_count, 750);
        assert_eq!(chunks[0].content.len(), 3000);
    }

    #[test]
    fn test_two_paragraphs_split_at_budget() {
        // Each paragraph estimates to 300 tokens; together they would be 600
        let para = "b".repeat(1200);
        let text = format!("{}\n\n{}", para, para);
        let chunks = chunk_transcript(&text, 500);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].token_count, 300);
        assert_eq!(chunks[1].token_count, 300);
    }

    #[test]
    fn test_small_paragraphs_accumulate() {
        let text = "one\n\ntwo\n\nthree";
        let chunks = chunk_transcript(&text, 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "one\n\ntwo\n\nthree");
    }

    #[test]
    fn test_concatenation_preserves_paragraphs_in_order() {
        let paragraphs: Vec<String> = (0..20)
            .map(|i| format!("Paragraph number {} with some padding text. {}", i, "x".repeat(200)))
            .collect();
        let text = paragraphs.join("\n\n");

        let chunks = chunk_transcript(&text, 100);
        assert!(chunks.len() > 1);

        let rejoined: Vec<&str> = chunks
            .iter()
            .flat_map(|c| c.content.split("\n\n"))
            .collect();
        assert_eq!(rejoined.len(), paragraphs.len());
        for (original, recovered) in paragraphs.iter().zip(rejoined) {
            assert_eq!(original, recovered);
        }
    }

    #[test]
    fn test_multiple_blank_lines_are_one_boundary() {
        let text = "first\n\n\n\nsecond";
        let chunks = chunk_transcript(text, 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "first\n\nsecond");
    }

    #[test]
    fn test_leading_and_trailing_blank_lines_ignored() {
        let chunks = chunk_transcript("\n\nonly paragraph\n\n", 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "only paragraph");
    }

    #[test]
    fn test_token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_chunk_boundary_exact_budget_fits() {
        // Two 250-token paragraphs exactly fill a 500 budget; no split
        let para = "c".repeat(1000);
        let text = format!("{}\n\n{}", para, para);
        let chunks = chunk_transcript(&text, 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].token_count, 500);
    }
}
