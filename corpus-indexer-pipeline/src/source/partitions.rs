//! Partition selection for the change feed.

use crate::errors::PipelineError;

/// Topic metadata as reported by the brokers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TopicLayout {
    pub name: String,
    pub error: Option<String>,
    pub partitions: Vec<PartitionLayout>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PartitionLayout {
    pub id: i32,
    pub error: Option<String>,
}

/// Ids of the partitions of `topic` that can be subscribed.
///
/// Partitions reporting an error are skipped. A missing or failed topic, or
/// one with no healthy partition, is a connection error.
pub(crate) fn usable_partitions(
    topic: &str,
    topics: &[TopicLayout],
) -> Result<Vec<i32>, PipelineError> {
    let layout = topics
        .iter()
        .find(|layout| layout.name == topic)
        .ok_or_else(|| PipelineError::connection(format!("Topic '{}' not found", topic)))?;

    if let Some(err) = &layout.error {
        return Err(PipelineError::connection(format!(
            "Topic '{}' unavailable: {}",
            topic, err
        )));
    }

    let mut usable = Vec::with_capacity(layout.partitions.len());
    for partition in &layout.partitions {
        match &partition.error {
            Some(err) => tracing::warn!(
                partition = partition.id,
                error = %err,
                "Skipping unavailable partition"
            ),
            None => usable.push(partition.id),
        }
    }

    if usable.is_empty() {
        return Err(PipelineError::connection(format!(
            "No partition of topic '{}' could be subscribed",
            topic
        )));
    }
    Ok(usable)
}
