use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    models::telemetry::PublishRequest,
    services::{
        payload_parser::PayloadParser, queue_publisher::QueuePublisher,
        token_verifier::TokenVerifier,
    },
};

use super::super::ingest_error::{IngestError, IngestResult};

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Structs:                                                 |
/// |   - IngestServices                                       |
/// | Functions:                                               |
/// |   - handle_telemetry_request                             |
/// +----------------------------------------------------------+

/// Collaborators shared by every in-flight ingest request.
///
/// Built once at startup and only read afterwards.
pub struct IngestServices {
    pub token_verifier: Arc<dyn TokenVerifier>,
    pub payload_parser: PayloadParser,
    pub queue_publisher: Arc<dyn QueuePublisher>,
    /// Topic every reading is published to
    pub data_topic: String,
    /// Claim holding the device identifier
    pub device_id_claim: String,
}

/// Processes a fully received telemetry request.
///
/// # Arguments
///
/// * `authorization` - First `Authorization` header value, if any
/// * `body` - The complete request body
/// * `services` - Token verifier, payload parser and queue publisher
///
/// # Flow
///
/// 1. Verifies the bearer token into a claim set
/// 2. Parses the body into a telemetry document
/// 3. Reads the device identifier from the claims
/// 4. Serializes the data field of the document
/// 5. Publishes it once, keyed by the device identifier, and waits for completion
///
/// # Error Handling
///
/// * A missing header or undecodable token is `IngestError::AuthParse`
/// * A token failing validation is `IngestError::AuthVerification`
/// * A malformed body or missing data field is `IngestError::BadPayload`
/// * A claim set without a non-empty string device id is `IngestError::BadDeviceIdentity`
/// * A failed publish is `IngestError::Publish`; it is not retried
pub async fn handle_telemetry_request(
    authorization: Option<&str>,
    body: &[u8],
    services: &IngestServices,
) -> IngestResult {
    let authorization = authorization
        .ok_or_else(|| IngestError::AuthParse("missing Authorization header".to_string()))?;

    let claims = services.token_verifier.verify(authorization)?;

    let document = services.payload_parser.parse(body)?;

    let device_id = claims
        .device_id(&services.device_id_claim)
        .ok_or(IngestError::BadDeviceIdentity)?;

    let value = services.payload_parser.extract_data(&document).map_err(|e| {
        warn!("Rejecting reading from {}: {}", device_id, e);
        IngestError::from(e)
    })?;

    debug!("Publishing {} bytes for device {}", value.len(), device_id);
    services
        .queue_publisher
        .publish(PublishRequest::new(&services.data_topic, device_id, value))
        .await?;

    info!("Telemetry published for device {}", device_id);
    Ok(())
}
