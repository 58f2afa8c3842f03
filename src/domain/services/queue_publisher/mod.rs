use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::telemetry::PublishRequest;

/// Writes keyed telemetry messages to the message broker.
///
/// One call is one publish attempt: implementations never retry and never batch across
/// requests themselves. The returned future may complete on any runtime thread.
#[async_trait]
pub trait QueuePublisher: Send + Sync {
    /// Publishes `request.value` to `request.topic` under `request.key`.
    ///
    /// # Returns
    /// * `Ok(())` - The broker client accepted the message
    /// * `Err(PublishError)` - The message could not be handed to the broker
    async fn publish(&self, request: PublishRequest) -> Result<(), PublishError>;
}

/// Failure reported by the publish completion signal.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The broker or its client rejected the message.
    #[error("broker rejected message: {0}")]
    Rejected(String),

    /// The publisher was shut down before the message could be written.
    #[error("publisher unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
use mockall::*;

#[cfg(test)]
mock! {
    pub QueuePublisher {}

    #[async_trait]
    impl QueuePublisher for QueuePublisher {
        async fn publish(&self, request: PublishRequest) -> Result<(), PublishError>;
    }
}
