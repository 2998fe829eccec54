//! Command line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::IndexingError;
use corpus_indexer_pipeline::source::FeedConfig;
use corpus_indexer_pipeline::PipelineConfig;
use corpus_indexer_repository::{Analyzer, IndexMapping};

/// Command line arguments. Every flag can also be set from the environment
/// or a `.env` file.
#[derive(Parser, Debug, Clone)]
#[command(name = "corpus-indexer")]
#[command(about = "Index a JSON corpus and serve full-text queries over HTTP", long_about = None)]
pub struct Cli {
    /// Batch size for indexing
    #[arg(long, env = "BATCH_SIZE", default_value_t = 100)]
    pub batch_size: usize,

    /// HTTP listen address
    #[arg(long, env = "BIND_ADDR", default_value = ":8094")]
    pub addr: String,

    /// Directory of JSON documents
    #[arg(long, env = "JSON_DIR", default_value = "data/")]
    pub json_dir: PathBuf,

    /// Index path
    #[arg(long, env = "INDEX_PATH", default_value = "corpus-search.tantivy")]
    pub index: PathBuf,

    /// Change feed URL; when set, documents are read from the feed instead
    /// of the JSON directory
    #[arg(long, env = "FEED_URL")]
    pub feed_url: Option<String>,

    /// Consumer group used for the change feed
    #[arg(long, env = "FEED_GROUP", default_value = "corpus-indexer")]
    pub feed_group: String,

    /// Feed silence, in milliseconds, after which ingestion stops
    #[arg(long, env = "IDLE_TIMEOUT_MS", default_value_t = 1000)]
    pub idle_timeout_ms: u64,

    /// Number of documents between progress reports
    #[arg(long, env = "REPORT_EVERY", default_value_t = 1000)]
    pub report_every: u64,

    /// Text analyzer for a newly created index (en|standard)
    #[arg(long, env = "ANALYZER", default_value = "en")]
    pub analyzer: Analyzer,

    /// Write logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

/// Validated, immutable runtime configuration.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Listen address as given, e.g. `:8094` or `127.0.0.1:8094`.
    pub bind_addr: String,
    pub json_dir: PathBuf,
    pub index_path: PathBuf,
    /// Feed connection; `None` selects the JSON directory.
    pub feed: Option<FeedConfig>,
    /// Mapping used if the index has to be created.
    pub mapping: IndexMapping,
    pub pipeline: PipelineConfig,
    pub log_json: bool,
}

impl TryFrom<Cli> for IndexerConfig {
    type Error = IndexingError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if cli.batch_size == 0 {
            return Err(IndexingError::config("batch size must be at least 1"));
        }
        if cli.idle_timeout_ms == 0 {
            return Err(IndexingError::config("idle timeout must be at least 1ms"));
        }
        split_host_port(&cli.addr)?;

        let feed = cli
            .feed_url
            .as_deref()
            .map(|url| {
                FeedConfig::from_url(url).map(|feed| feed.with_group_id(cli.feed_group.clone()))
            })
            .transpose()
            .map_err(|e| IndexingError::config(e.to_string()))?;

        Ok(Self {
            bind_addr: cli.addr,
            json_dir: cli.json_dir,
            index_path: cli.index,
            feed,
            mapping: IndexMapping::with_analyzer(cli.analyzer),
            pipeline: PipelineConfig {
                batch_size: cli.batch_size,
                report_every: cli.report_every,
                idle_timeout: Duration::from_millis(cli.idle_timeout_ms),
            },
            log_json: cli.log_json,
        })
    }
}

impl IndexerConfig {
    /// Address to bind the listener to. An empty host binds every interface.
    pub fn socket_addr(&self) -> Result<String, IndexingError> {
        let (host, port) = split_host_port(&self.bind_addr)?;
        let host = if host.is_empty() { "0.0.0.0" } else { host };
        Ok(format!("{}:{}", host, port))
    }

    /// URL at which the API can be reached. An empty host is shown as
    /// `localhost`.
    pub fn listen_url(&self) -> Result<String, IndexingError> {
        let (host, port) = split_host_port(&self.bind_addr)?;
        let host = if host.is_empty() { "localhost" } else { host };
        Ok(format!("http://{}:{}", host, port))
    }
}

fn split_host_port(addr: &str) -> Result<(&str, &str), IndexingError> {
    match addr.rsplit_once(':') {
        Some((host, port)) if port.parse::<u16>().is_ok() => Ok((host, port)),
        _ => Err(IndexingError::config(format!(
            "invalid listen address '{}', expected [host]:port",
            addr
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<IndexerConfig, IndexingError> {
        let cli = Cli::try_parse_from(std::iter::once("corpus-indexer").chain(args.iter().copied()))
            .map_err(|e| IndexingError::config(e.to_string()))?;
        IndexerConfig::try_from(cli)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();

        assert_eq!(config.bind_addr, ":8094");
        assert_eq!(config.json_dir, PathBuf::from("data/"));
        assert_eq!(config.index_path, PathBuf::from("corpus-search.tantivy"));
        assert!(config.feed.is_none());
        assert_eq!(config.mapping.analyzer, Analyzer::En);
        assert_eq!(config.pipeline.batch_size, 100);
        assert_eq!(config.pipeline.report_every, 1000);
        assert_eq!(config.pipeline.idle_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_feed_url_selects_feed() {
        let config = parse(&[
            "--feed-url",
            "kafka://localhost:9092/beer-sample",
            "--feed-group",
            "beer",
            "--idle-timeout-ms",
            "250",
            "--analyzer",
            "standard",
        ])
        .unwrap();

        let feed = config.feed.unwrap();
        assert_eq!(feed.topic, "beer-sample");
        assert_eq!(feed.group_id, "beer");
        assert_eq!(config.pipeline.idle_timeout, Duration::from_millis(250));
        assert_eq!(config.mapping.analyzer, Analyzer::Standard);
    }

    #[test]
    fn test_invalid_settings_are_config_errors() {
        for args in [
            vec!["--batch-size", "0"],
            vec!["--addr", "8094"],
            vec!["--feed-url", "http://localhost/beer"],
            vec!["--analyzer", "klingon"],
        ] {
            assert!(
                matches!(parse(&args), Err(IndexingError::ConfigError(_))),
                "{:?} should be rejected",
                args
            );
        }
    }

    #[test]
    fn test_listen_addresses() {
        let mut config = parse(&[]).unwrap();
        assert_eq!(config.socket_addr().unwrap(), "0.0.0.0:8094");
        assert_eq!(config.listen_url().unwrap(), "http://localhost:8094");

        config.bind_addr = "127.0.0.1:9000".to_string();
        assert_eq!(config.socket_addr().unwrap(), "127.0.0.1:9000");
        assert_eq!(config.listen_url().unwrap(), "http://127.0.0.1:9000");
    }
}
