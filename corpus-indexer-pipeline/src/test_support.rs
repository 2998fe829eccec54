//! Test doubles shared by the pipeline's unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use corpus_indexer_repository::{IndexBatch, IndexEngine, IndexError};
use corpus_indexer_shared::{Document, SearchRequest, SearchResponse};
use serde_json::Value;

/// Index engine that records every applied batch.
pub struct MockIndexEngine {
    applied: Mutex<Vec<Vec<(String, Document)>>>,
    apply_calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl MockIndexEngine {
    pub fn new() -> Self {
        Self {
            applied: Mutex::new(Vec::new()),
            apply_calls: AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    /// Reject the n-th call to `apply_batch` (zero-based).
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new()
        }
    }

    pub fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    /// Sizes of the batches that were accepted, in order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.applied.lock().unwrap().iter().map(Vec::len).collect()
    }

    /// Ids of every accepted document, in apply order.
    pub fn indexed_ids(&self) -> Vec<String> {
        self.applied
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn indexed_documents(&self) -> Vec<Document> {
        self.applied
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|(_, doc)| doc.clone())
            .collect()
    }
}

#[async_trait]
impl IndexEngine for MockIndexEngine {
    async fn apply_batch(&self, batch: IndexBatch) -> Result<(), IndexError> {
        let call = self.apply_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            return Err(IndexError::write("batch rejected"));
        }

        self.applied.lock().unwrap().push(batch.into_entries());
        Ok(())
    }

    async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse, IndexError> {
        Ok(SearchResponse::empty())
    }

    async fn fields(&self) -> Result<Vec<String>, IndexError> {
        Ok(Vec::new())
    }

    async fn document(&self, _id: &str) -> Result<Option<Value>, IndexError> {
        Ok(None)
    }

    async fn doc_count(&self) -> Result<u64, IndexError> {
        Ok(self.indexed_ids().len() as u64)
    }
}
