//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name       | Description                                        | Key Methods          |
// |------------|----------------------------------------------------|----------------------|
// | ClaimSet   | Claims of a verified bearer token                  | get, device_id       |
//--------------------------------------------------------------------------------------------------

use serde::Deserialize;
use serde_json::{Map, Value};

/// Claims carried by a verified bearer token.
///
/// Produced once per request by a `TokenVerifier` and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Returns the raw value of a claim.
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    /// Returns the device identifier held under `claim`.
    ///
    /// Only a non-empty string counts; an absent claim, an empty string and any non-string
    /// value all yield `None`.
    pub fn device_id(&self, claim: &str) -> Option<&str> {
        match self.0.get(claim) {
            Some(Value::String(id)) if !id.is_empty() => Some(id.as_str()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(claims: Map<String, Value>) -> Self {
        Self::new(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> ClaimSet {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn device_id_returns_non_empty_string() {
        let set = claims(json!({ "deviceId": "dev-1", "exp": 1 }));
        assert_eq!(set.device_id("deviceId"), Some("dev-1"));
    }

    #[test]
    fn device_id_rejects_absent_empty_and_non_string() {
        assert_eq!(claims(json!({ "exp": 1 })).device_id("deviceId"), None);
        assert_eq!(claims(json!({ "deviceId": "" })).device_id("deviceId"), None);
        assert_eq!(claims(json!({ "deviceId": 42 })).device_id("deviceId"), None);
        assert_eq!(claims(json!({ "deviceId": null })).device_id("deviceId"), None);
        assert_eq!(
            claims(json!({ "deviceId": ["dev-1"] })).device_id("deviceId"),
            None
        );
    }

    #[test]
    fn device_id_honours_configured_claim_name() {
        let set = claims(json!({ "sub": "dev-9", "deviceId": "dev-1" }));
        assert_eq!(set.device_id("sub"), Some("dev-9"));
    }
}
