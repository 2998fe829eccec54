//! Kafka implementation of the change feed.
//!
//! Every partition of the topic is assigned directly, starting from the
//! beginning, so the feed replays the whole topic and then follows it.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use rdkafka::{
    config::ClientConfig,
    consumer::{Consumer, StreamConsumer},
    message::{BorrowedMessage, Headers, Message},
    metadata::Metadata,
    Offset, TopicPartitionList,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::source::feed::ChangeFeed;
use crate::source::feed_config::FeedConfig;
use crate::source::messages::{find_op_header, FeedEvent, StreamMessage};
use crate::source::partitions::{usable_partitions, PartitionLayout, TopicLayout};

/// How long to wait for topic metadata when connecting.
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Size of the event channel buffer.
const CHANNEL_BUFFER_SIZE: usize = 1000;

/// Change feed reading a Kafka topic.
pub struct KafkaFeed {
    config: FeedConfig,
}

impl KafkaFeed {
    /// Create a feed for the given connection settings. No connection is made
    /// until [`ChangeFeed::subscribe`] is called.
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::new();
        client
            .set("bootstrap.servers", &self.config.brokers)
            .set("group.id", &self.config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000");

        if let (Some(username), Some(password)) = (&self.config.username, &self.config.password) {
            client
                .set("security.protocol", "SASL_PLAINTEXT")
                .set("sasl.mechanisms", "PLAIN")
                .set("sasl.username", username)
                .set("sasl.password", password);
        }
        client
    }

    /// Build an assignment covering every healthy partition of the topic.
    fn assignment(&self, metadata: &Metadata) -> Result<TopicPartitionList, PipelineError> {
        let topics: Vec<TopicLayout> = metadata
            .topics()
            .iter()
            .map(|topic| TopicLayout {
                name: topic.name().to_string(),
                error: topic.error().map(|err| format!("{:?}", err)),
                partitions: topic
                    .partitions()
                    .iter()
                    .map(|partition| PartitionLayout {
                        id: partition.id(),
                        error: partition.error().map(|err| format!("{:?}", err)),
                    })
                    .collect(),
            })
            .collect();

        let mut assignment = TopicPartitionList::new();
        for id in usable_partitions(&self.config.topic, &topics)? {
            if let Err(e) = assignment.add_partition_offset(&self.config.topic, id, Offset::Beginning)
            {
                warn!(partition = id, error = %e, "Failed to subscribe partition");
            }
        }

        if assignment.count() == 0 {
            return Err(PipelineError::connection(format!(
                "No partition of topic '{}' could be subscribed",
                self.config.topic
            )));
        }
        Ok(assignment)
    }
}

#[async_trait]
impl ChangeFeed for KafkaFeed {
    #[instrument(skip(self), fields(brokers = %self.config.brokers, topic = %self.config.topic))]
    async fn subscribe(&mut self) -> Result<mpsc::Receiver<StreamMessage>, PipelineError> {
        let consumer: StreamConsumer = self
            .client_config()
            .create()
            .map_err(|e| PipelineError::connection(e.to_string()))?;

        let metadata = consumer
            .fetch_metadata(Some(&self.config.topic), METADATA_TIMEOUT)
            .map_err(|e| PipelineError::connection(format!("Failed to fetch metadata: {}", e)))?;
        let assignment = self.assignment(&metadata)?;
        consumer.assign(&assignment)?;

        info!(
            partitions = assignment.count(),
            "Subscribed to feed from the beginning"
        );

        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        tokio::spawn(forward(consumer, sender));
        Ok(receiver)
    }
}

/// Forward consumed messages until the stream ends or the receiver is dropped.
async fn forward(consumer: StreamConsumer, sender: mpsc::Sender<StreamMessage>) {
    let mut message_stream = consumer.stream();

    loop {
        tokio::select! {
            _ = sender.closed() => {
                debug!("Feed receiver dropped, stopping consumer");
                break;
            }
            message = message_stream.next() => {
                let forwarded = match message {
                    Some(Ok(msg)) => sender.send(StreamMessage::Event(to_event(&msg))).await,
                    Some(Err(e)) => {
                        error!(error = %e, "Kafka error");
                        sender.send(StreamMessage::Error(e.to_string())).await
                    }
                    None => {
                        info!("Kafka stream ended");
                        let _ = sender.send(StreamMessage::End).await;
                        break;
                    }
                };
                if forwarded.is_err() {
                    break;
                }
            }
        }
    }
}

fn to_event(msg: &BorrowedMessage<'_>) -> FeedEvent {
    let op_header = msg
        .headers()
        .and_then(|headers| find_op_header(headers.iter().map(|header| (header.key, header.value))));

    FeedEvent::from_message(
        msg.key(),
        msg.payload(),
        op_header,
        msg.partition(),
        msg.offset(),
    )
}
