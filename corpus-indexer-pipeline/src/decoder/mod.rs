//! Decoder module for the ingestion pipeline.
//!
//! Turns raw record payloads into documents for the index engine.

mod document_decoder;

pub use document_decoder::DocumentDecoder;
