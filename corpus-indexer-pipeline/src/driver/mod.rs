//! Driver module for the ingestion pipeline.
//!
//! Pulls records from the active source, decodes them, feeds the batch
//! accumulator and decides when the run is over.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::batch::{BatchAccumulator, DEFAULT_BATCH_SIZE};
use crate::decoder::DocumentDecoder;
use crate::errors::PipelineError;
use crate::progress::{ProgressReporter, RunStats, DEFAULT_REPORT_EVERY};
use crate::source::{ChangeFeed, DirectorySource, StreamMessage};
use corpus_indexer_repository::IndexEngine;
use corpus_indexer_shared::Document;

/// Default silence on a feed after which it is treated as drained.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for the ingestion driver.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of documents per batch.
    pub batch_size: usize,
    /// Number of documents between progress reports.
    pub report_every: u64,
    /// Silence on a feed that ends the run.
    pub idle_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            report_every: DEFAULT_REPORT_EVERY,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Draining,
    Aborted,
    Terminated,
}

/// Where a run reads its documents from.
pub enum IngestSource {
    /// A finite directory of JSON files, decoded up front.
    Directory(DirectorySource),
    /// A change feed; payloads are decoded by the index engine.
    Feed(Box<dyn ChangeFeed>),
}

impl IngestSource {
    fn kind(&self) -> &'static str {
        match self {
            Self::Directory(_) => "directory",
            Self::Feed(_) => "feed",
        }
    }
}

/// Drives one ingestion run into the index.
///
/// The driver:
/// - Reads records from the source in order
/// - Decodes directory records before batching
/// - Applies a batch whenever it reaches the configured size
/// - Flushes the residual batch once the source is drained
///
/// Any error aborts the run. Batches applied before the error stay in the
/// index.
pub struct IngestDriver {
    engine: Arc<dyn IndexEngine>,
    decoder: DocumentDecoder,
    reporter: ProgressReporter,
    config: PipelineConfig,
    state: PipelineState,
}

impl IngestDriver {
    /// Create a driver with the default configuration.
    pub fn new(engine: Arc<dyn IndexEngine>) -> Self {
        Self::with_config(engine, PipelineConfig::default())
    }

    /// Create a driver with custom configuration.
    pub fn with_config(engine: Arc<dyn IndexEngine>, config: PipelineConfig) -> Self {
        Self {
            engine,
            decoder: DocumentDecoder::new(),
            reporter: ProgressReporter::new(config.report_every),
            config,
            state: PipelineState::Idle,
        }
    }

    /// Current state of the run.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run the pipeline until the source is drained or an error occurs.
    ///
    /// # Returns
    ///
    /// * `Ok(RunStats)` - Counters of the finished run
    /// * `Err(PipelineError)` - The error that aborted the run
    #[instrument(
        skip(self, source),
        fields(source = source.kind(), batch_size = self.config.batch_size)
    )]
    pub async fn run(&mut self, source: IngestSource) -> Result<RunStats, PipelineError> {
        info!("Indexing...");
        self.state = PipelineState::Running;

        let mut stats = RunStats::start();
        let mut accumulator =
            BatchAccumulator::with_batch_size(self.engine.clone(), self.config.batch_size);

        let ingested = match source {
            IngestSource::Directory(dir) => {
                self.ingest_directory(&dir, &mut accumulator, &mut stats).await
            }
            IngestSource::Feed(feed) => self.ingest_feed(feed, &mut accumulator, &mut stats).await,
        };
        if let Err(e) = ingested {
            return Err(self.abort(e));
        }

        self.state = PipelineState::Draining;
        match accumulator.flush().await {
            Ok(0) => {}
            Ok(_) => stats.batches_flushed += 1,
            Err(e) => return Err(self.abort(e)),
        }

        self.state = PipelineState::Terminated;
        self.reporter.finish(&stats);
        info!(
            total_indexed = stats.total_indexed,
            batches_flushed = stats.batches_flushed,
            "Indexing complete"
        );
        Ok(stats)
    }

    fn abort(&mut self, err: PipelineError) -> PipelineError {
        error!(error = %err, "Indexing aborted");
        self.state = PipelineState::Aborted;
        err
    }

    async fn ingest_directory(
        &self,
        source: &DirectorySource,
        accumulator: &mut BatchAccumulator,
        stats: &mut RunStats,
    ) -> Result<(), PipelineError> {
        let mut listing = source.open().await?;

        while let Some(record) = listing.next_record().await? {
            let document = self.decoder.decode(&record.id, &record.payload)?;
            self.accept(document, accumulator, stats).await?;
        }

        debug!("Directory listing consumed");
        Ok(())
    }

    async fn ingest_feed(
        &self,
        mut feed: Box<dyn ChangeFeed>,
        accumulator: &mut BatchAccumulator,
        stats: &mut RunStats,
    ) -> Result<(), PipelineError> {
        let mut messages = feed.subscribe().await?;
        // Only events extend the idle window; feed errors do not.
        let mut deadline = Instant::now() + self.config.idle_timeout;

        loop {
            let next = tokio::time::timeout_at(deadline, messages.recv()).await;
            let message = match next {
                Ok(message) => message,
                Err(_) => {
                    info!(
                        idle_ms = self.config.idle_timeout.as_millis() as u64,
                        "Feed idle, draining"
                    );
                    break;
                }
            };

            match message {
                Some(StreamMessage::Event(event)) => {
                    deadline = Instant::now() + self.config.idle_timeout;
                    if !event.is_mutation() {
                        debug!(
                            key = %event.key,
                            opcode = ?event.opcode,
                            "Ignoring non-mutation event"
                        );
                        continue;
                    }
                    if event.key.is_empty() {
                        warn!(
                            partition = event.partition,
                            offset = event.offset,
                            "Skipping event without key"
                        );
                        continue;
                    }

                    let document = self.decoder.passthrough(&event.key, event.value);
                    self.accept(document, accumulator, stats).await?;
                }
                Some(StreamMessage::Error(e)) => {
                    error!(error = %e, "Received error from feed");
                }
                Some(StreamMessage::End) | None => {
                    info!("Feed ended");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Add one document to the open batch, flushing and reporting as needed.
    async fn accept(
        &self,
        document: Document,
        accumulator: &mut BatchAccumulator,
        stats: &mut RunStats,
    ) -> Result<(), PipelineError> {
        accumulator.add(document.id.clone(), document);

        if accumulator.should_flush() {
            accumulator.flush().await?;
            stats.batches_flushed += 1;
        }

        stats.total_indexed += 1;
        self.reporter.observe(stats);
        Ok(())
    }
}
