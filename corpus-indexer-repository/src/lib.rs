//! # Corpus Indexer Repository
//!
//! This crate provides the index engine interface used by the ingestion
//! pipeline and the query API, along with a concrete implementation backed
//! by Tantivy.

pub mod config;
pub mod engine;
pub mod errors;
pub mod interfaces;
pub mod types;

pub use config::{Analyzer, IndexMapping};
pub use engine::{TantivyIndex, MAX_RESULT_WINDOW};
pub use errors::IndexError;
pub use interfaces::IndexEngine;
pub use types::IndexBatch;
