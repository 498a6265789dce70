//! Event decoding and claim validation.

use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error;

use super::schema::validate_request_schema;

/// Minimum claim length in characters, after trimming.
pub const MIN_CLAIM_CHARS: usize = 5;

/// Maximum claim length in characters, after trimming.
pub const MAX_CLAIM_CHARS: usize = 2000;

/// Errors raised before any external call is made.
#[derive(Error, Debug)]
pub enum GateError {
    /// Missing, empty, short, long or mistyped `text`.
    #[error("{0}")]
    BadRequest(String),

    /// The body was a string that does not decode as JSON.
    #[error("Invalid JSON in request body")]
    Decode(#[from] serde_json::Error),
}

impl GateError {
    fn missing_text() -> Self {
        Self::BadRequest("Missing 'text' field in request body".to_string())
    }
}

/// A validated, trimmed claim of 5 to 2000 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim(String);

impl Claim {
    /// Trim and bound-check raw claim text.
    pub fn new(raw: &str) -> Result<Self, GateError> {
        let text = raw.trim();
        let chars = text.chars().count();

        if chars < MIN_CLAIM_CHARS {
            return Err(GateError::BadRequest(
                "Text field cannot be empty or too short".to_string(),
            ));
        }

        if chars > MAX_CLAIM_CHARS {
            return Err(GateError::BadRequest(format!(
                "Text too long. Maximum {} characters.",
                MAX_CLAIM_CHARS
            )));
        }

        Ok(Self(text.to_string()))
    }

    /// The trimmed claim text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `max_chars` characters, for log lines.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an incoming event asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `httpMethod: OPTIONS`
    Preflight,

    /// A claim that passed the gate.
    Check(Claim),
}

/// Decode an invocation event into a [`Request`].
///
/// The event is either an HTTP-style envelope carrying `httpMethod` and a
/// JSON `body` string, or the bare request object itself. A `body` that is
/// already an object is accepted as-is; a null or empty body counts as `{}`.
pub fn parse_event(event: &JsonValue) -> Result<Request, GateError> {
    if event.get("httpMethod").and_then(JsonValue::as_str) == Some("OPTIONS") {
        return Ok(Request::Preflight);
    }

    let decoded;
    let body = match event.get("body") {
        Some(JsonValue::String(raw)) if !raw.is_empty() => {
            decoded = serde_json::from_str::<JsonValue>(raw)?;
            &decoded
        }
        Some(JsonValue::Null) | Some(JsonValue::String(_)) => return Err(GateError::missing_text()),
        Some(inline) => inline,
        None => event,
    };

    if body.get("text").is_none() {
        return Err(GateError::missing_text());
    }

    if let Err(violations) = validate_request_schema(body) {
        tracing::debug!(?violations, "Request body failed schema validation");
        return Err(GateError::BadRequest(format!(
            "Invalid request body: {}",
            violations.join("; ")
        )));
    }

    // Schema guarantees `text` is a string at this point.
    let text = body["text"].as_str().unwrap_or_default();
    Claim::new(text).map(Request::Check)
}
