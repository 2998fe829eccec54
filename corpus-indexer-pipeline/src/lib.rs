//! # Corpus Indexer Pipeline
//!
//! This crate provides the ingestion pipeline that loads documents from a
//! directory of JSON files or from a change feed into the index engine.
//!
//! ## Architecture
//!
//! Data flows in one direction:
//!
//! 1. **Source**: Lists a directory or follows a change feed
//! 2. **Decoder**: Turns raw payloads into documents
//! 3. **Batch**: Buffers documents and applies them in bounded batches
//! 4. **Progress**: Logs throughput every N documents
//! 5. **Driver**: Coordinates the run and decides when it is over

pub mod batch;
pub mod decoder;
pub mod driver;
pub mod errors;
pub mod progress;
pub mod source;

#[cfg(test)]
mod test_support;

pub use batch::BatchAccumulator;
pub use decoder::DocumentDecoder;
pub use driver::{IngestDriver, IngestSource, PipelineConfig, PipelineState};
pub use errors::PipelineError;
pub use progress::{ProgressReport, ProgressReporter, RunStats};
