//! Source readers for the ingestion pipeline.
//!
//! A run reads from either a directory of JSON files or a change feed.

mod directory_source;
mod feed;
mod feed_config;
#[cfg(feature = "kafka")]
mod kafka_feed;
mod messages;
#[cfg_attr(not(feature = "kafka"), allow(dead_code))]
mod partitions;

pub use directory_source::{DirectoryListing, DirectorySource};
pub use feed::ChangeFeed;
pub use feed_config::FeedConfig;
#[cfg(feature = "kafka")]
pub use kafka_feed::KafkaFeed;
pub use messages::{FeedEvent, FeedOpcode, StreamMessage};
