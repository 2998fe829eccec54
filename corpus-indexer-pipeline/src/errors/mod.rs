//! Error types for the ingestion pipeline.

use corpus_indexer_repository::IndexError;
use thiserror::Error;

/// Errors that abort an ingestion run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A source could not be listed or read.
    #[error("IO error: {0}")]
    IoError(String),

    /// A payload could not be parsed into a document.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The change feed could not be connected or subscribed.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The index engine rejected a batch.
    #[error("Index write error: {0}")]
    IndexWriteError(String),
}

impl PipelineError {
    /// Create an IO error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }
}

impl From<IndexError> for PipelineError {
    fn from(err: IndexError) -> Self {
        Self::IndexWriteError(err.to_string())
    }
}

#[cfg(feature = "kafka")]
impl From<rdkafka::error::KafkaError> for PipelineError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::ConnectionError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_error_becomes_write_error() {
        let err: PipelineError = IndexError::decode("k1", "expected value").into();

        assert!(matches!(err, PipelineError::IndexWriteError(_)));
        assert!(err.to_string().contains("k1"));
    }
}
