//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                      | Return Type         |
// |-----------------|--------------------------------------------------|---------------------|
// | health          | Health check endpoint                            | impl IntoResponse   |
// | ingest          | Accepts one telemetry reading                    | Response            |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use axum::{
    Json,
    body::to_bytes,
    extract::{Extension, Request},
    http::{Method, header},
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use super::{AppState, error::into_response};
use crate::inbounds::{
    handlers::telemetry_handler::handle_telemetry_request,
    ingest_error::{IngestError, IngestResult},
};

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

/// Telemetry ingest endpoint
///
/// Rejects anything but POST before touching the body. Otherwise the body is read in full,
/// then token verification, parsing and publishing run on a worker task. Whatever happens,
/// exactly one response is produced from the outcome.
pub async fn ingest(Extension(state): Extension<Arc<AppState>>, request: Request) -> Response {
    let outcome = process(state, request).await;

    if let Err(err) = &outcome {
        if err.status().is_server_error() {
            error!("Ingest request failed: {}", err);
        } else {
            warn!("Ingest request rejected: {}", err);
        }
    }

    into_response(outcome)
}

async fn process(state: Arc<AppState>, request: Request) -> IngestResult {
    if request.method() != Method::POST {
        return Err(IngestError::MethodNotAllowed(request.method().clone()));
    }

    let (parts, body) = request.into_parts();

    // Only the first value counts when the header is repeated
    let authorization = parts
        .headers
        .get(header::AUTHORIZATION)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    let body = to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| IngestError::TransportRead(e.to_string()))?;

    let services = state.services.clone();
    tokio::spawn(async move {
        handle_telemetry_request(authorization.as_deref(), &body, &services).await
    })
    .await
    .map_err(|e| IngestError::Worker(e.to_string()))?
}
