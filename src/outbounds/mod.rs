//! Adapters writing to external systems.

/// `QueuePublisher` backed by the RabbitMQ topic exchange.
pub mod rabbit_queue_publisher;
