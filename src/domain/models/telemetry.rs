//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name              | Description                                   | Key Methods          |
// |-------------------|-----------------------------------------------|----------------------|
// | TelemetryDocument | Parsed request body                           | field                |
// | PublishRequest    | Keyed message bound for the data topic        | new                  |
//--------------------------------------------------------------------------------------------------

use serde_json::Value;

/// Parsed form of a telemetry request body.
///
/// The payload under the data field is opaque and forwarded verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryDocument(Value);

impl TelemetryDocument {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    /// Returns the value of a top-level field, or `None` when the document is not an
    /// object or the field is absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.as_object().and_then(|object| object.get(name))
    }
}

/// A message ready for the queue: the device key and the serialized payload.
///
/// Built only after both authentication and parsing succeeded, submitted once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub topic: String,
    pub key: String,
    pub value: String,
}

impl PublishRequest {
    pub fn new(topic: &str, key: &str, value: String) -> Self {
        Self {
            topic: topic.to_owned(),
            key: key.to_owned(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_reads_top_level_object_members() {
        let doc = TelemetryDocument::new(json!({ "data": { "temp": 21 } }));
        assert_eq!(doc.field("data"), Some(&json!({ "temp": 21 })));
        assert_eq!(doc.field("missing"), None);
    }

    #[test]
    fn field_is_absent_on_non_object_documents() {
        assert_eq!(TelemetryDocument::new(json!([1, 2])).field("data"), None);
        assert_eq!(TelemetryDocument::new(json!("data")).field("data"), None);
    }

    #[test]
    fn field_keeps_explicit_null() {
        let doc = TelemetryDocument::new(json!({ "data": null }));
        assert_eq!(doc.field("data"), Some(&Value::Null));
    }
}
