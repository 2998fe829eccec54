//! Message types for the change feed.
//!
//! Defines the events that flow from a feed subscription to the driver.

/// Header carrying an explicit operation name on a feed message.
pub const OP_HEADER: &str = "op";

/// Kind of change carried by a feed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOpcode {
    /// Document was created or updated.
    Mutation,
    /// Document was deleted.
    Deletion,
    /// Stream bookkeeping with no document attached.
    Control,
}

impl FeedOpcode {
    /// Classify a message from its `op` header and whether it has a payload.
    ///
    /// An explicit header wins. Without one, a message without payload is a
    /// tombstone and everything else is a mutation.
    pub fn classify(op_header: Option<&str>, has_payload: bool) -> Self {
        match op_header.map(str::to_ascii_lowercase).as_deref() {
            Some("delete") | Some("deletion") => Self::Deletion,
            Some("control") | Some("snapshot") => Self::Control,
            Some(_) => Self::Mutation,
            None if has_payload => Self::Mutation,
            None => Self::Deletion,
        }
    }
}

/// A single change received from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEvent {
    /// Document key.
    pub key: String,
    /// Raw document payload.
    pub value: Vec<u8>,
    pub opcode: FeedOpcode,
    /// Partition the event was read from.
    pub partition: i32,
    /// Offset within the partition.
    pub offset: i64,
}

impl FeedEvent {
    /// Create a mutation event.
    pub fn mutation(
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
        partition: i32,
        offset: i64,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            opcode: FeedOpcode::Mutation,
            partition,
            offset,
        }
    }

    /// Create a deletion event.
    pub fn deletion(key: impl Into<String>, partition: i32, offset: i64) -> Self {
        Self {
            key: key.into(),
            value: Vec::new(),
            opcode: FeedOpcode::Deletion,
            partition,
            offset,
        }
    }

    /// Build an event from the parts of a consumed message.
    ///
    /// Keys and headers are read as UTF-8, replacing invalid sequences.
    pub fn from_message(
        key: Option<&[u8]>,
        payload: Option<&[u8]>,
        op_header: Option<&[u8]>,
        partition: i32,
        offset: i64,
    ) -> Self {
        let op_header = op_header.map(String::from_utf8_lossy);

        Self {
            key: key
                .map(|key| String::from_utf8_lossy(key).into_owned())
                .unwrap_or_default(),
            value: payload.map(<[u8]>::to_vec).unwrap_or_default(),
            opcode: FeedOpcode::classify(op_header.as_deref(), payload.is_some()),
            partition,
            offset,
        }
    }

    /// Whether the event should be indexed.
    pub fn is_mutation(&self) -> bool {
        self.opcode == FeedOpcode::Mutation
    }
}

/// Value of the first `op` header among `(name, value)` pairs.
#[cfg_attr(not(feature = "kafka"), allow(dead_code))]
pub fn find_op_header<'a, I>(headers: I) -> Option<&'a [u8]>
where
    I: IntoIterator<Item = (&'a str, Option<&'a [u8]>)>,
{
    headers
        .into_iter()
        .find(|(name, _)| *name == OP_HEADER)
        .and_then(|(_, value)| value)
}

/// Messages sent from a feed subscription.
#[derive(Debug)]
pub enum StreamMessage {
    /// A change event.
    Event(FeedEvent),
    /// A non-fatal error reported by the feed.
    Error(String),
    /// The feed ended.
    End,
}
