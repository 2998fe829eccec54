//! Record and document types that flow through the ingestion pipeline.

use serde_json::Value;

/// A raw record read from a source, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Identifier derived from the source (file stem or feed key).
    pub id: String,
    /// Undecoded payload bytes.
    pub payload: Vec<u8>,
}

impl Record {
    /// Create a new record.
    pub fn new(id: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
        }
    }
}

/// Body of a document as handed to the index engine.
///
/// `Fields` holds an already-decoded generic value (object, array, or
/// scalar). `Raw` carries the payload untouched; the engine decodes it when
/// the batch is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentBody {
    Fields(Value),
    Raw(Vec<u8>),
}

/// A document ready to be added to an index batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: DocumentBody,
}

impl Document {
    /// Create a document from a decoded value.
    pub fn from_fields(id: impl Into<String>, fields: Value) -> Self {
        Self {
            id: id.into(),
            body: DocumentBody::Fields(fields),
        }
    }

    /// Create a document whose payload is decoded later by the engine.
    pub fn from_raw(id: impl Into<String>, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            body: DocumentBody::Raw(raw.into()),
        }
    }

    /// The decoded fields, if this document was decoded up front.
    pub fn fields(&self) -> Option<&Value> {
        match &self.body {
            DocumentBody::Fields(value) => Some(value),
            DocumentBody::Raw(_) => None,
        }
    }
}
