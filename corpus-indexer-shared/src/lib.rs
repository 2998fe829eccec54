//! # Corpus Indexer Shared
//!
//! Types shared by the repository, pipeline, and API crates.
//!
//! - [`Record`]: a raw identifier/payload pair produced by a source
//! - [`Document`]: the decoded form handed to the index engine
//! - [`SearchRequest`] / [`SearchResponse`]: the query API wire format

mod document;
mod search;

pub use document::{Document, DocumentBody, Record};
pub use search::{QueryBody, SearchHit, SearchRequest, SearchResponse};
