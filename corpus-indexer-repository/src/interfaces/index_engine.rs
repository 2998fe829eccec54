//! Index engine trait definition.
//!
//! This module defines the abstract interface the ingestion pipeline and the
//! query API use to talk to the full-text index, allowing the Tantivy
//! implementation to be swapped for a mock in tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::IndexError;
use crate::types::IndexBatch;
use corpus_indexer_shared::{SearchRequest, SearchResponse};

/// Abstract interface for index engine operations.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: one handle is shared between the
/// ingestion task and every request handled by the query API. Readers must
/// be able to run while a batch is being applied.
///
/// # Error Handling
///
/// All methods return `Result<T, IndexError>`.
#[async_trait]
pub trait IndexEngine: Send + Sync {
    /// Create a new, empty batch.
    fn new_batch(&self) -> IndexBatch {
        IndexBatch::new()
    }

    /// Apply every document in the batch as one unit.
    ///
    /// Either all documents become visible to readers or none do. Documents
    /// whose id already exists in the index replace the stored document.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the batch was committed
    /// * `Err(IndexError)` - If the engine rejected the batch
    async fn apply_batch(&self, batch: IndexBatch) -> Result<(), IndexError>;

    /// Execute a search request.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - Hits ordered by descending score
    /// * `Err(IndexError::InvalidQuery)` - If the query string does not parse
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, IndexError>;

    /// List the document field paths known to the index, sorted.
    async fn fields(&self) -> Result<Vec<String>, IndexError>;

    /// Fetch the stored document for an id, if present.
    async fn document(&self, id: &str) -> Result<Option<Value>, IndexError>;

    /// Number of documents currently visible to readers.
    async fn doc_count(&self) -> Result<u64, IndexError>;
}
