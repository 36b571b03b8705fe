//! Lectern - Lecture Transcript Processing
//!
//! A CLI tool that turns lecture transcripts into a searchable knowledge base:
//! token-bounded chunks with vector embeddings for semantic retrieval, and an
//! ordered topic outline extracted by a language model.
//!
//! # Overview
//!
//! Lectern allows you to:
//! - Ingest lecture transcripts and split them into token-bounded chunks
//! - Embed each chunk for later semantic search
//! - Extract an ordered list of topics with summaries per lecture
//! - Track each lecture through a `pending -> processing -> completed | failed`
//!   status lifecycle
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `chunking` - Paragraph-based transcript chunking
//! - `embedding` - Embedding generation
//! - `topics` - LLM topic extraction
//! - `store` - Lecture/chunk/topic persistence
//! - `orchestrator` - Pipeline coordination and status state machine
//!
//! # Example
//!
//! ```rust,no_run
//! use lectern::config::Settings;
//! use lectern::orchestrator::Orchestrator;
//! use lectern::store::{Lecture, LectureStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let lecture = Lecture::new(
//!         "user-1".to_string(),
//!         "Intro to Databases".to_string(),
//!         "Today we cover indexing.\n\nFirst, B-trees...".to_string(),
//!     );
//!     orchestrator.store().create_lecture(&lecture).await?;
//!
//!     let outcome = orchestrator.process_lecture(&lecture.id).await?;
//!     println!(
//!         "{} chunks, {} topics",
//!         outcome.chunks_processed, outcome.topic_count
//!     );
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod store;
pub mod topics;

pub use error::{LecternError, Result};
