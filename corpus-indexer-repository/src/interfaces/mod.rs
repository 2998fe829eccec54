//! Interface definitions for the index engine.
//!
//! This module defines the abstract `IndexEngine` trait shared by the
//! ingestion pipeline (sole writer) and the query API (many readers).

mod index_engine;

pub use index_engine::IndexEngine;
