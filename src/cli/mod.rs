//! CLI module for Lectern.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Lectern - Lecture Transcript Processing
///
/// Turns lecture transcripts into embedded, searchable chunks and an ordered
/// topic outline.
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Lectern configuration and data directory
    Init,

    /// Add a lecture transcript, leaving it pending for processing
    Add {
        /// Path to a transcript text file, or "-" for stdin
        input: String,

        /// Lecture title
        #[arg(short, long)]
        title: String,

        /// Submitting user ID
        #[arg(short, long, default_value = "local")]
        user: String,

        /// Immediately process the lecture after adding it
        #[arg(long)]
        process: bool,
    },

    /// Run the processing pipeline for a pending (or any) lecture
    Process {
        /// Lecture ID to process
        lecture_id: String,
    },

    /// List lectures and their processing status
    List,

    /// Show one lecture's status, error, and extracted topics
    Show {
        /// Lecture ID to show
        lecture_id: String,
    },

    /// Search embedded chunks across all lectures
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.3")]
        min_score: f32,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
