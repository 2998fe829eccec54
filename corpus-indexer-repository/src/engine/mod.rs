//! Tantivy implementation of the index engine.
//!
//! This module provides a concrete implementation of `IndexEngine`
//! using an on-disk Tantivy index as the backend.

mod client;
mod fields;
mod index_config;

pub use client::{TantivyIndex, MAX_RESULT_WINDOW};
