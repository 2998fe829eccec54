//! Batch module for the ingestion pipeline.
//!
//! Buffers documents and applies them to the index engine in bounded batches.

use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::errors::PipelineError;
use corpus_indexer_repository::{IndexBatch, IndexEngine};
use corpus_indexer_shared::Document;

/// Default number of documents per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Accumulates documents into a single open batch.
///
/// The batch is applied as one unit once it reaches the configured size. A
/// rejected batch is not retried; the error is returned to the caller.
pub struct BatchAccumulator {
    engine: Arc<dyn IndexEngine>,
    batch: IndexBatch,
    batch_size: usize,
}

impl BatchAccumulator {
    /// Create an accumulator with the default batch size.
    pub fn new(engine: Arc<dyn IndexEngine>) -> Self {
        Self::with_batch_size(engine, DEFAULT_BATCH_SIZE)
    }

    /// Create an accumulator flushing every `batch_size` documents.
    ///
    /// A size of zero is treated as one.
    pub fn with_batch_size(engine: Arc<dyn IndexEngine>, batch_size: usize) -> Self {
        let batch = engine.new_batch();
        Self {
            engine,
            batch,
            batch_size: batch_size.max(1),
        }
    }

    /// Append a document to the open batch and return the new count.
    pub fn add(&mut self, id: impl Into<String>, document: Document) -> usize {
        self.batch.index(id, document);
        self.batch.len()
    }

    /// Whether the open batch reached the configured size.
    pub fn should_flush(&self) -> bool {
        self.batch.len() >= self.batch_size
    }

    /// Number of documents in the open batch.
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Apply the open batch and start a new one.
    ///
    /// Flushing an empty batch does nothing and returns zero.
    ///
    /// # Returns
    ///
    /// * `Ok(count)` - Number of documents written
    /// * `Err(PipelineError::IndexWriteError)` - If the engine rejected the batch
    #[instrument(skip(self), fields(count = self.batch.len()))]
    pub async fn flush(&mut self) -> Result<usize, PipelineError> {
        if self.batch.is_empty() {
            return Ok(0);
        }

        let batch = std::mem::replace(&mut self.batch, self.engine.new_batch());
        let count = batch.len();

        match self.engine.apply_batch(batch).await {
            Ok(()) => {
                debug!(count = count, "Flushed batch to index");
                Ok(count)
            }
            Err(e) => {
                error!(error = %e, count = count, "Index rejected batch");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockIndexEngine;
    use serde_json::json;

    fn doc(id: &str) -> Document {
        Document::from_fields(id, json!({"name": id}))
    }

    #[tokio::test]
    async fn test_add_and_flush() {
        let engine = Arc::new(MockIndexEngine::new());
        let mut accumulator = BatchAccumulator::with_batch_size(engine.clone(), 2);

        assert_eq!(accumulator.add("a", doc("a")), 1);
        assert!(!accumulator.should_flush());
        assert_eq!(accumulator.add("b", doc("b")), 2);
        assert!(accumulator.should_flush());

        assert_eq!(accumulator.flush().await.unwrap(), 2);
        assert!(accumulator.is_empty());
        assert_eq!(engine.batch_sizes(), vec![2]);
        assert_eq!(engine.indexed_ids(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_empty_flush_skips_engine() {
        let engine = Arc::new(MockIndexEngine::new());
        let mut accumulator = BatchAccumulator::new(engine.clone());

        assert_eq!(accumulator.flush().await.unwrap(), 0);
        assert_eq!(engine.apply_calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_batch_is_write_error() {
        let engine = Arc::new(MockIndexEngine::failing_on(0));
        let mut accumulator = BatchAccumulator::with_batch_size(engine.clone(), 10);
        accumulator.add("a", doc("a"));

        let err = accumulator.flush().await.unwrap_err();
        assert!(matches!(err, PipelineError::IndexWriteError(_)));
        assert_eq!(engine.apply_calls(), 1);
        assert!(engine.indexed_ids().is_empty());
    }

    #[test]
    fn test_zero_batch_size_is_one() {
        let engine = Arc::new(MockIndexEngine::new());
        let mut accumulator = BatchAccumulator::with_batch_size(engine, 0);

        accumulator.add("a", doc("a"));
        assert!(accumulator.should_flush());
    }
}
