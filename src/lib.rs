// Expose the modules
pub mod api;
pub mod config;
pub mod domain;
pub mod inbounds;
pub mod outbounds;

// Re-export key types for easier usage
pub use api::{Api, AppState};
pub use config::{Config, ConfigError, JwtConfig, JwtKey};
pub use domain::models::{claims::ClaimSet, telemetry::{PublishRequest, TelemetryDocument}};
pub use domain::services::payload_parser::{PayloadError, PayloadParser};
pub use domain::services::queue_publisher::{PublishError, QueuePublisher};
pub use domain::services::token_verifier::{
    TokenError, TokenVerifier, jwt_token_verifier::JwtTokenVerifier,
};
pub use inbounds::handlers::telemetry_handler::{IngestServices, handle_telemetry_request};
pub use inbounds::ingest_error::{IngestError, IngestResult};
pub use outbounds::rabbit_queue_publisher::RabbitQueuePublisher;
