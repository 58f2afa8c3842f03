use serde_json::Value;
use thiserror::Error;

use crate::domain::models::telemetry::TelemetryDocument;

/// Name of the body field whose value is forwarded to the queue.
pub const DATA_FIELD: &str = "data";

/// Parses request bodies into telemetry documents and extracts the forwarded payload.
///
/// Only structural well-formedness is checked. Whether the data field is present is decided
/// by `extract_data`, called once the request is otherwise accepted.
#[derive(Debug, Clone)]
pub struct PayloadParser {
    data_field: String,
}

impl Default for PayloadParser {
    fn default() -> Self {
        Self::new(DATA_FIELD)
    }
}

impl PayloadParser {
    pub fn new(data_field: &str) -> Self {
        Self {
            data_field: data_field.to_owned(),
        }
    }

    /// Parses raw body bytes.
    ///
    /// # Errors
    /// Returns `PayloadError::Malformed` when the bytes are not a well-formed JSON document
    pub fn parse(&self, bytes: &[u8]) -> Result<TelemetryDocument, PayloadError> {
        serde_json::from_slice::<Value>(bytes)
            .map(TelemetryDocument::new)
            .map_err(|err| PayloadError::Malformed(err.to_string()))
    }

    /// Serializes the data field of `document` to compact JSON text.
    ///
    /// # Errors
    /// Returns `PayloadError::MissingField` when the document has no data field
    pub fn extract_data(&self, document: &TelemetryDocument) -> Result<String, PayloadError> {
        let data = document
            .field(&self.data_field)
            .ok_or_else(|| PayloadError::MissingField(self.data_field.clone()))?;

        serde_json::to_string(data).map_err(|err| PayloadError::Malformed(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("document has no `{0}` field")]
    MissingField(String),
}
