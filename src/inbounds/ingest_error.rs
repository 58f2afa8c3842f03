use axum::http::Method;
use thiserror::Error;

use crate::domain::services::{
    payload_parser::PayloadError, queue_publisher::PublishError, token_verifier::TokenError,
};

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Enums:                                                   |
/// |   - IngestError                                          |
/// | Types:                                                   |
/// |   - IngestResult                                         |
/// +----------------------------------------------------------+

/// Outcome of one ingest request; `Ok(())` is a published reading.
pub type IngestResult = Result<(), IngestError>;

/// Every way an ingest request can fail.
///
/// Each variant is detected at exactly one stage of the pipeline and maps to exactly one
/// HTTP response. None of them is retried.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The request used a method other than POST.
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),

    /// The request body could not be read in full.
    #[error("failed to read request body: {0}")]
    TransportRead(String),

    /// The bearer token is missing or cannot be decoded.
    #[error("token could not be parsed: {0}")]
    AuthParse(String),

    /// The bearer token decoded but failed verification.
    #[error("token could not be verified: {0}")]
    AuthVerification(String),

    /// The body is not well-formed or lacks the data field.
    #[error("bad payload: {0}")]
    BadPayload(#[from] PayloadError),

    /// The verified token carries no usable device identifier.
    #[error("token carries no usable device identity")]
    BadDeviceIdentity,

    /// The queue reported failure for the single publish attempt.
    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),

    /// The worker task processing the request did not complete.
    #[error("worker task failed: {0}")]
    Worker(String),
}

impl From<TokenError> for IngestError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Parse(reason) => IngestError::AuthParse(reason),
            TokenError::Verification(reason) => IngestError::AuthVerification(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_keep_their_kind() {
        assert!(matches!(
            IngestError::from(TokenError::Parse("InvalidToken".to_string())),
            IngestError::AuthParse(_)
        ));
        assert!(matches!(
            IngestError::from(TokenError::Verification("ExpiredSignature".to_string())),
            IngestError::AuthVerification(_)
        ));
    }

    #[test]
    fn test_ingest_error_display() {
        let err = IngestError::BadPayload(PayloadError::MissingField("data".to_string()));
        assert_eq!(format!("{}", err), "bad payload: document has no `data` field");

        let err = IngestError::MethodNotAllowed(Method::GET);
        assert_eq!(format!("{}", err), "method GET not allowed");
    }
}
