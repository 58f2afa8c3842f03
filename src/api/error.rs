//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                      | Return Type         |
// |-----------------|--------------------------------------------------|---------------------|
// | into_response   | Maps an ingest outcome to its single response    | Response            |
//--------------------------------------------------------------------------------------------------

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::inbounds::ingest_error::{IngestError, IngestResult};

pub const TOKEN_PARSE_MESSAGE: &str = "Token could not be parsed";
pub const TOKEN_VERIFY_MESSAGE: &str = "Token could not be verified";
pub const BAD_REQUEST_MESSAGE: &str = "Bad Request";
pub const SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

impl IngestError {
    /// HTTP status the failure is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::AuthParse(_) | Self::AuthVerification(_) => StatusCode::UNAUTHORIZED,
            Self::BadPayload(_) | Self::BadDeviceIdentity => StatusCode::BAD_REQUEST,
            Self::TransportRead(_) | Self::Publish(_) | Self::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Response body sent to the client. Internal details never leave the process.
    pub fn body(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed(_) => "",
            Self::AuthParse(_) => TOKEN_PARSE_MESSAGE,
            Self::AuthVerification(_) => TOKEN_VERIFY_MESSAGE,
            Self::BadPayload(_) | Self::BadDeviceIdentity => BAD_REQUEST_MESSAGE,
            Self::TransportRead(_) | Self::Publish(_) | Self::Worker(_) => SERVER_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        match self {
            Self::MethodNotAllowed(_) => (
                self.status(),
                [(header::ALLOW, "POST"), (header::CONNECTION, "close")],
            )
                .into_response(),
            _ => (self.status(), self.body()).into_response(),
        }
    }
}

/// Converts the outcome of one request into the one response written for it.
pub fn into_response(outcome: IngestResult) -> Response {
    match outcome {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => err.into_response(),
    }
}
