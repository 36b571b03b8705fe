//! Configuration management for Lectern.

mod settings;

pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, Settings, StoreSettings, TopicSettings,
};
