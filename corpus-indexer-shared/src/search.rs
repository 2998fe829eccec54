//! Query API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default number of hits returned when the request does not say.
const DEFAULT_SIZE: usize = 10;

fn default_size() -> usize {
    DEFAULT_SIZE
}

/// The query part of a search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryBody {
    /// Query string in the engine's query syntax, e.g. `body.name:light`.
    pub query: String,
}

/// A search request as accepted by `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: QueryBody,
    /// Maximum number of hits to return.
    #[serde(default = "default_size")]
    pub size: usize,
    /// Number of hits to skip.
    #[serde(default)]
    pub from: usize,
    /// Stored fields to return with each hit. `["*"]` returns the whole
    /// document; empty returns ids and scores only.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl SearchRequest {
    /// Build a request for the given query string with default paging.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: QueryBody {
                query: query.into(),
            },
            size: DEFAULT_SIZE,
            from: 0,
            fields: Vec::new(),
        }
    }

    /// Set the page size.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the page offset.
    pub fn with_from(mut self, from: usize) -> Self {
        self.from = from;
        self
    }

    /// Request stored fields with each hit.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Whether any stored fields were requested.
    pub fn wants_fields(&self) -> bool {
        !self.fields.is_empty()
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,
}

/// Response returned by `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total_hits: u64,
    pub max_score: f32,
    pub took_ms: u64,
    pub hits: Vec<SearchHit>,
}

impl SearchResponse {
    /// An empty response.
    pub fn empty() -> Self {
        Self {
            total_hits: 0,
            max_score: 0.0,
            took_ms: 0,
            hits: Vec::new(),
        }
    }
}
