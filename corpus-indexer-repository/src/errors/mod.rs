//! Error types for the corpus indexer repository.

mod index_error;

pub use index_error::IndexError;
