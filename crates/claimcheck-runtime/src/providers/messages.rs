//! Anthropic Messages wire format.
//!
//! Shared by the direct Anthropic API and Bedrock `InvokeModel`, which
//! accepts the same body with `anthropic_version` in place of `model`.

use serde::{Deserialize, Serialize};

use super::{ChatMessage, CompletionConfig, CompletionResponse, ProviderError, TokenUsage};

/// Version string Bedrock expects inside the body.
pub(crate) const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_version: Option<&'static str>,
    pub max_tokens: u32,
    pub messages: Vec<WireMessage>,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentBlock {
    Text { text: String },
}

impl MessagesRequest {
    pub fn new(messages: Vec<ChatMessage>, config: &CompletionConfig) -> Self {
        let messages = messages
            .into_iter()
            .map(|msg| WireMessage {
                role: msg.role,
                content: vec![ContentBlock::Text { text: msg.content }],
            })
            .collect();

        Self {
            model: None,
            anthropic_version: None,
            max_tokens: config.max_tokens,
            messages,
            temperature: config.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    content: Vec<ContentBlockResponse>,
    #[serde(default)]
    model: Option<String>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlockResponse {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl MessagesResponse {
    /// Convert to a [`CompletionResponse`]; a reply without text is an error.
    pub fn into_completion(self, requested_model: &str) -> Result<CompletionResponse, ProviderError> {
        let content = self
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if content.trim().is_empty() {
            return Err(ProviderError::ParseError(
                "completion contained no text content".to_string(),
            ));
        }

        Ok(CompletionResponse {
            content,
            usage: TokenUsage {
                prompt_tokens: self.usage.input_tokens,
                completion_tokens: self.usage.output_tokens,
            },
            model: self.model.unwrap_or_else(|| requested_model.to_string()),
            stop_reason: self.stop_reason,
        })
    }
}

/// Error body; Anthropic nests it under `error`, Bedrock uses a flat `message`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default, alias = "Message")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Best-effort error message from a failed response body.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(detail), .. }) => detail.message,
        Ok(ErrorBody { message: Some(message), .. }) => message,
        _ => body.chars().take(200).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_body_shape() {
        let request =
            MessagesRequest::new(vec![ChatMessage::user("claim")], &CompletionConfig::default());
        assert_eq!(request.messages.len(), 1);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][0]["text"], "claim");
        assert_eq!(json["max_tokens"], 700);
        assert!(json.get("model").is_none());
        assert!(json.get("anthropic_version").is_none());
    }

    #[test]
    fn test_bedrock_body_shape() {
        let mut request =
            MessagesRequest::new(vec![ChatMessage::user("claim")], &CompletionConfig::default());
        request.anthropic_version = Some(BEDROCK_ANTHROPIC_VERSION);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_into_completion() {
        let response: MessagesResponse = serde_json::from_value(serde_json::json!({
            "content": [{ "type": "text", "text": "**Classification:** True" }],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 900, "output_tokens": 120 }
        }))
        .unwrap();
        let completion = response.into_completion("model-a").unwrap();
        assert_eq!(completion.content, "**Classification:** True");
        assert_eq!(completion.model, "model-a");
        assert_eq!(completion.usage.total(), 1020);
    }

    #[test]
    fn test_empty_content_is_error() {
        let response: MessagesResponse =
            serde_json::from_value(serde_json::json!({ "content": [], "stop_reason": null }))
                .unwrap();
        assert!(matches!(
            response.into_completion("m"),
            Err(ProviderError::ParseError(_))
        ));
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#),
            "Overloaded"
        );
        assert_eq!(error_message(r#"{"message":"Model not ready"}"#), "Model not ready");
        assert_eq!(error_message("plain failure"), "plain failure");
    }
}
