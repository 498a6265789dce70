//! Response envelope.
//!
//! Every response, including errors, carries the same CORS header set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::request::GateError;

/// Header names and values attached to every response.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token",
    ),
    ("Access-Control-Allow-Methods", "GET,POST,OPTIONS"),
];

/// Body of a preflight response.
pub const PREFLIGHT_MESSAGE: &str = "CORS preflight successful";

/// `{statusCode, headers, body}` as returned to the invoking environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ResponseEnvelope {
    fn new(status_code: u16, body: String) -> Self {
        let headers = CORS_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            status_code,
            headers,
            body,
        }
    }

    /// 200 with the verdict text as the raw body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body.into())
    }

    /// 200 acknowledging a CORS preflight.
    pub fn preflight() -> Self {
        Self::new(200, serde_json::json!({ "message": PREFLIGHT_MESSAGE }).to_string())
    }

    /// 400 with `{"error": message}`.
    pub fn bad_request(message: impl AsRef<str>) -> Self {
        Self::new(400, error_body(message.as_ref()))
    }

    /// 500 with `{"error": "Internal server error: <message>"}`.
    pub fn internal_error(message: impl AsRef<str>) -> Self {
        Self::new(
            500,
            error_body(&format!("Internal server error: {}", message.as_ref())),
        )
    }

    /// 400 for a request rejected at the gate.
    pub fn rejected(error: &GateError) -> Self {
        Self::bad_request(error.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

fn error_body(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cors(envelope: &ResponseEnvelope) {
        assert_eq!(envelope.headers.len(), 3);
        assert_eq!(envelope.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(envelope.headers["Access-Control-Allow-Methods"], "GET,POST,OPTIONS");
        assert!(envelope.headers["Access-Control-Allow-Headers"].contains("Content-Type"));
    }

    #[test]
    fn test_ok_body_is_raw_text() {
        let envelope = ResponseEnvelope::ok("**Classification:** True");
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.body, "**Classification:** True");
        assert_cors(&envelope);
    }

    #[test]
    fn test_preflight() {
        let envelope = ResponseEnvelope::preflight();
        assert_eq!(envelope.status_code, 200);
        let body: serde_json::Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "CORS preflight successful" }));
        assert_cors(&envelope);
    }

    #[test]
    fn test_error_bodies() {
        let envelope = ResponseEnvelope::bad_request("Text too long. Maximum 2000 characters.");
        assert_eq!(envelope.status_code, 400);
        assert_eq!(envelope.body, r#"{"error":"Text too long. Maximum 2000 characters."}"#);
        assert_cors(&envelope);

        let envelope = ResponseEnvelope::internal_error("no models \"configured\"");
        assert_eq!(envelope.status_code, 500);
        let body: serde_json::Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["error"], "Internal server error: no models \"configured\"");
    }

    #[test]
    fn test_rejected_decode_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let envelope = ResponseEnvelope::rejected(&GateError::from(err));
        assert_eq!(envelope.status_code, 400);
        assert_eq!(envelope.body, r#"{"error":"Invalid JSON in request body"}"#);
    }

    #[test]
    fn test_envelope_serializes_camel_case() {
        let value = serde_json::to_value(ResponseEnvelope::ok("x")).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["body"], "x");
        assert!(value["headers"].is_object());
    }
}
