//! External collaborator abstractions for claimcheck-runtime.
//!
//! Four services are consumed, each behind a trait so the pipeline can be
//! assembled from real HTTP clients or from test doubles:
//!
//! - [`LlmProvider`]: chat completion (Bedrock, Anthropic)
//! - [`Translator`]: language detection and translation
//! - [`KnowledgeIndex`]: hybrid retrieval over the curated knowledge base
//! - [`WebSearch`]: domain-restricted live search
//!
//! ## Security
//!
//! All clients use the [`secrets`] module for credential handling.
//! See [`ApiCredential`] for the recommended patterns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod anthropic;
mod bedrock;
mod factory;
mod knowledge;
mod messages;
mod search;
pub mod secrets;
mod translate;

pub use anthropic::{AnthropicProvider, AnthropicProviderFactory, ANTHROPIC_API_KEY_ENV};
pub use bedrock::{runtime_endpoint, BedrockProvider, BedrockProviderFactory, BEDROCK_API_KEY_ENV};
pub use factory::{ProviderFactory, ProviderRegistry};
pub use knowledge::{agent_runtime_endpoint, BedrockKnowledgeIndex, KnowledgeIndex};
pub use search::{
    TavilySearch, WebSearch, DEFAULT_SEARCH_TIMEOUT, SEARCH_DOMAINS, TAVILY_API_KEY_ENV,
};
pub use secrets::{ApiCredential, CredentialSource};
pub use translate::{
    HttpTranslator, Translation, Translator, AUTO_DETECT, TRANSLATE_API_KEY_ENV,
};

/// Errors from external services.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Map a transport error, distinguishing timeouts.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::HttpError(err.to_string())
        }
    }

    /// Classify a non-success status. `message` is the best-effort error text.
    pub(crate) fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            401 | 403 => Self::AuthError,
            429 => Self::RateLimited { retry_after: None },
            code => Self::ApiError {
                status: code,
                message,
            },
        }
    }
}

/// Configuration for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Model to use
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "apac.anthropic.claude-3-7-sonnet-20250219-v1:0".to_string(),
            max_tokens: 700,
            temperature: 0.1,
            timeout: Duration::from_secs(30),
        }
    }
}

impl CompletionConfig {
    /// Same settings, different model.
    pub fn for_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }
}

/// A chat message for LLM completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "user" or "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from an LLM completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content
    pub content: String,

    /// Token usage
    pub usage: TokenUsage,

    /// Model used
    pub model: String,

    /// Stop reason
    pub stop_reason: Option<String>,
}

/// Token usage from a completion.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Provider abstraction allows swapping LLM backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Execute a chat completion.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Get provider name for logs.
    fn name(&self) -> &str;
}
