//! Index error types.
//!
//! This module defines the error types that can occur during index operations.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while opening, writing to, or querying an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// No index exists at the given path.
    #[error("Index not found: {0}")]
    NotFound(String),

    /// An index already exists at the given path.
    #[error("Index already exists: {0}")]
    AlreadyExists(String),

    /// The index exists but could not be opened or created.
    #[error("Open error: {0}")]
    OpenError(String),

    /// A batch write was rejected by the engine.
    #[error("Write error: {0}")]
    WriteError(String),

    /// A raw payload could not be decoded into a document.
    #[error("Decode error for document '{id}': {reason}")]
    DecodeError { id: String, reason: String },

    /// The query string could not be parsed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Reading from the index failed.
    #[error("Read error: {0}")]
    ReadError(String),

    /// Filesystem error while managing index metadata.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    /// Create a not found error for the given index path.
    pub fn not_found(path: &Path) -> Self {
        Self::NotFound(path.display().to_string())
    }

    /// Create an already-exists error for the given index path.
    pub fn already_exists(path: &Path) -> Self {
        Self::AlreadyExists(path.display().to_string())
    }

    /// Create an open error.
    pub fn open(msg: impl Into<String>) -> Self {
        Self::OpenError(msg.into())
    }

    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::WriteError(msg.into())
    }

    /// Create a decode error for a document.
    pub fn decode(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DecodeError {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid query error.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Create a read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::ReadError(msg.into())
    }

    /// Whether this error means the index does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
