//! Dependency initialization and wiring for the corpus indexer.

use std::sync::Arc;
use tracing::info;

use crate::config::IndexerConfig;
use crate::IndexingError;
use corpus_indexer_pipeline::source::DirectorySource;
use corpus_indexer_pipeline::{IngestDriver, IngestSource};
use corpus_indexer_repository::{IndexEngine, TantivyIndex};

/// An ingestion run ready to be spawned.
pub struct Ingest {
    pub driver: IngestDriver,
    pub source: IngestSource,
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Index shared by the ingestion task and the query API.
    pub engine: Arc<dyn IndexEngine>,
    /// Present only when the index was created by this process.
    pub ingest: Option<Ingest>,
}

impl Dependencies {
    /// Open the index, creating it when missing.
    ///
    /// An existing index is served as is. A newly created index gets an
    /// ingestion run reading from the feed if one is configured, otherwise
    /// from the JSON directory.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the index cannot be opened or created
    pub fn new(config: &IndexerConfig) -> Result<Self, IndexingError> {
        info!(
            index_path = %config.index_path.display(),
            json_dir = %config.json_dir.display(),
            feed = config.feed.as_ref().map(|feed| feed.topic.as_str()),
            "Initializing dependencies"
        );

        let (index, created) = TantivyIndex::open_or_create(&config.index_path, &config.mapping)?;
        let engine: Arc<dyn IndexEngine> = Arc::new(index);

        let ingest = if created {
            info!("Creating new index...");
            let source = build_source(config)?;
            let driver = IngestDriver::with_config(engine.clone(), config.pipeline.clone());
            Some(Ingest { driver, source })
        } else {
            info!("Opening existing index...");
            None
        };

        Ok(Self { engine, ingest })
    }
}

fn build_source(config: &IndexerConfig) -> Result<IngestSource, IndexingError> {
    match &config.feed {
        None => Ok(IngestSource::Directory(DirectorySource::new(config.json_dir.clone()))),
        Some(feed) => feed_source(feed),
    }
}

#[cfg(feature = "kafka")]
fn feed_source(
    feed: &corpus_indexer_pipeline::source::FeedConfig,
) -> Result<IngestSource, IndexingError> {
    use corpus_indexer_pipeline::source::KafkaFeed;

    Ok(IngestSource::Feed(Box::new(KafkaFeed::new(feed.clone()))))
}

#[cfg(not(feature = "kafka"))]
fn feed_source(
    _feed: &corpus_indexer_pipeline::source::FeedConfig,
) -> Result<IngestSource, IndexingError> {
    Err(IndexingError::config(
        "feed URL given but this build has no Kafka support",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_indexer_pipeline::PipelineConfig;
    use corpus_indexer_repository::IndexMapping;

    fn config(dir: &std::path::Path) -> IndexerConfig {
        IndexerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            json_dir: dir.join("data"),
            index_path: dir.join("corpus.tantivy"),
            feed: None,
            mapping: IndexMapping::default(),
            pipeline: PipelineConfig::default(),
            log_json: false,
        }
    }

    #[tokio::test]
    async fn test_ingestion_only_for_new_index() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        let first = Dependencies::new(&config).unwrap();
        let ingest = first.ingest.expect("new index should be ingested");
        assert!(matches!(ingest.source, IngestSource::Directory(_)));
        drop(first.engine);
        drop(ingest);

        let second = Dependencies::new(&config).unwrap();
        assert!(second.ingest.is_none());
    }
}
