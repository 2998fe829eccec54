//! Change feed abstraction.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::PipelineError;
use crate::source::messages::StreamMessage;

/// A partitioned stream of document changes.
///
/// `subscribe` connects to every partition from the earliest position and
/// returns a channel that keeps delivering events until the receiver is
/// dropped. The feed has no natural end; the caller decides when it is
/// drained.
#[async_trait]
pub trait ChangeFeed: Send {
    /// Connect and start delivering events.
    ///
    /// # Returns
    ///
    /// * `Ok(Receiver)` - Channel of feed messages
    /// * `Err(PipelineError::ConnectionError)` - If the feed cannot be reached
    ///   or no partition could be subscribed
    async fn subscribe(&mut self) -> Result<mpsc::Receiver<StreamMessage>, PipelineError>;
}
