//! Batch type handed to the index engine.

use corpus_indexer_shared::Document;

/// An ordered group of document writes applied to the index as one unit.
///
/// Entries keep the order in which they were added. The same id may appear
/// more than once; when applied, the later entry wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexBatch {
    entries: Vec<(String, Document)>,
}

impl IndexBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under the given id.
    pub fn index(&mut self, id: impl Into<String>, document: Document) {
        self.entries.push((id.into(), document));
    }

    /// Number of documents in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn into_entries(self) -> Vec<(String, Document)> {
        self.entries
    }
}
