//! Publishes telemetry readings to RabbitMQ.

use async_trait::async_trait;
use rabbitmq::{Message, PublisherContext, PublisherDispatcher, RabbitMQError};
use tracing::{debug, error};
use uuid::Uuid;

use crate::domain::{
    models::telemetry::PublishRequest,
    services::queue_publisher::{PublishError, QueuePublisher},
};

const CONTENT_TYPE: &str = "application/json";

/// Sends each publish request to the topic exchange named by its topic, using the device key
/// as routing key.
///
/// The dispatcher is a cloneable handle on the publisher's background task, so one instance is
/// shared by every in-flight request.
pub struct RabbitQueuePublisher {
    exchange: String,
    dispatcher: PublisherDispatcher,
}

impl RabbitQueuePublisher {
    /// # Arguments
    ///
    /// * `exchange` - The topic exchange the dispatcher's publisher was declared for
    /// * `dispatcher` - Handle obtained from `Publisher::get_dispatcher`
    pub fn new(exchange: &str, dispatcher: PublisherDispatcher) -> Self {
        Self {
            exchange: exchange.to_owned(),
            dispatcher,
        }
    }
}

#[async_trait]
impl QueuePublisher for RabbitQueuePublisher {
    async fn publish(&self, request: PublishRequest) -> Result<(), PublishError> {
        if request.topic != self.exchange {
            return Err(PublishError::Unavailable(format!(
                "no publisher declared for topic {}",
                request.topic
            )));
        }

        let message_id = Uuid::new_v4().to_string();
        let ctx = PublisherContext::new(&Uuid::new_v4().to_string(), Some(message_id.clone()))
            .with_content_type(CONTENT_TYPE);
        let message = Message::new(request.value.into_bytes(), &request.key);

        self.dispatcher
            .publish(message, ctx)
            .await
            .map_err(|e| {
                error!("Error publishing telemetry to {}: {}", request.topic, e);
                PublishError::from(e)
            })?;

        debug!("Published message {} to {}", message_id, request.topic);
        Ok(())
    }
}

impl From<RabbitMQError> for PublishError {
    fn from(err: RabbitMQError) -> Self {
        match err {
            RabbitMQError::DispatcherClosed => PublishError::Unavailable(err.to_string()),
            other => PublishError::Rejected(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_dispatcher_maps_to_unavailable() {
        assert!(matches!(
            PublishError::from(RabbitMQError::DispatcherClosed),
            PublishError::Unavailable(_)
        ));
    }

    #[test]
    fn broker_failures_map_to_rejected() {
        assert!(matches!(
            PublishError::from(RabbitMQError::PublishError("channel closed".to_string())),
            PublishError::Rejected(reason) if reason.contains("channel closed")
        ));
    }
}
