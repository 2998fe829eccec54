//! # Corpus Indexer
//!
//! Main library for the corpus indexer.
//!
//! This crate provides configuration, dependency wiring and the HTTP query
//! API. The binary loads documents into the index in the background while
//! the API serves queries against it.

pub mod api;
pub mod config;
pub mod telemetry;

pub use config::{Cli, Dependencies, IndexerConfig};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] corpus_indexer_pipeline::PipelineError),

    /// Index error.
    #[error("Index error: {0}")]
    IndexError(#[from] corpus_indexer_repository::IndexError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
