//! Standard profile API response envelope

use serde::{Deserialize, Serialize};

/// `{ success, data?, message? }` wrapper used by every endpoint.
///
/// A missing or `false` `success` is a failure regardless of HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: Some(true),
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }

    /// Server-provided message or a generic fallback
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Payload of a successful envelope; the failure message otherwise.
    pub fn into_data(self) -> Result<T, String> {
        if !self.is_success() {
            return Err(self.message_or("Request was not successful"));
        }
        self.data
            .ok_or_else(|| "Response envelope has no data".to_string())
    }
}

/// Acknowledgement of a successful save
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ack {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_success_is_failure() {
        let env: Envelope<i32> = serde_json::from_value(json!({ "data": 5 })).unwrap();
        assert!(!env.is_success());
        assert!(env.into_data().is_err());
    }

    #[test]
    fn failure_message_is_surfaced() {
        let env: Envelope<i32> =
            serde_json::from_value(json!({ "success": false, "message": "Email taken" })).unwrap();
        assert_eq!(env.into_data(), Err("Email taken".to_string()));
    }

    #[test]
    fn success_yields_data() {
        let env: Envelope<Vec<i32>> =
            serde_json::from_value(json!({ "success": true, "data": [1, 2] })).unwrap();
        assert_eq!(env.into_data(), Ok(vec![1, 2]));
    }

    #[test]
    fn constructors_serialize_to_the_wire_shape() {
        let ok = serde_json::to_value(Envelope::ok(vec![1])).unwrap();
        assert_eq!(ok, json!({ "success": true, "data": [1] }));

        let failed = serde_json::to_value(Envelope::<()>::failure("nope")).unwrap();
        assert_eq!(failed, json!({ "success": false, "message": "nope" }));
    }
}
