//! Configuration and dependency wiring.

mod dependencies;
mod settings;

pub use dependencies::{Dependencies, Ingest};
pub use settings::{Cli, IndexerConfig};
