//! Amazon Bedrock provider (`InvokeModel` with the Anthropic messages body).
//!
//! Authenticates with a Bedrock API key sent as a bearer token, so no
//! request signing is needed.

use super::{
    factory::ProviderFactory,
    messages::{error_message, MessagesRequest, MessagesResponse, BEDROCK_ANTHROPIC_VERSION},
    secrets::{ApiCredential, CredentialSource},
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

/// Environment variable holding the Bedrock API key.
pub const BEDROCK_API_KEY_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";

pub(crate) const DEFAULT_REGION: &str = "ap-southeast-2";

/// Cross-region inference profiles, strongest first.
const DEFAULT_MODELS: [&str; 3] = [
    "apac.anthropic.claude-3-7-sonnet-20250219-v1:0",
    "apac.anthropic.claude-3-5-sonnet-20241022-v2:0",
    "apac.anthropic.claude-3-haiku-20240307-v1:0",
];

/// Bedrock runtime provider.
pub struct BedrockProvider {
    credential: ApiCredential,
    endpoint: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for BedrockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockProvider")
            .field("credential", &self.credential)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Regional Bedrock runtime endpoint.
pub fn runtime_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{}.amazonaws.com", region)
}

impl BedrockProvider {
    /// Create a provider for `region` with a programmatic key.
    pub fn new(api_key: impl Into<String>, region: &str) -> Self {
        Self::with_credential(
            ApiCredential::new(api_key, CredentialSource::Programmatic, "Bedrock API key"),
            region,
        )
    }

    fn with_credential(credential: ApiCredential, region: &str) -> Self {
        Self {
            credential,
            endpoint: runtime_endpoint(region),
            client: reqwest::Client::new(),
        }
    }

    /// Create from JSON configuration with environment fallback.
    ///
    /// Reads `api_key` (falling back to `AWS_BEARER_TOKEN_BEDROCK`), `region`
    /// and an optional `endpoint` override.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_config_or_env(
            config,
            "api_key",
            BEDROCK_API_KEY_ENV,
            "Bedrock API key",
        )?;
        debug!(
            credential = credential.name(),
            source = ?credential.source(),
            "Loaded provider credential"
        );

        let region = config["region"].as_str().unwrap_or(DEFAULT_REGION);
        let provider = Self::with_credential(credential, region);
        Ok(match config["endpoint"].as_str() {
            Some(url) => provider.with_endpoint(url.trim_end_matches('/')),
            None => provider,
        })
    }

    /// Override the regional endpoint.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    fn invoke_url(&self, model_id: &str) -> String {
        // Inference profile ids carry a ':' version suffix
        format!(
            "{}/model/{}/invoke",
            self.endpoint,
            model_id.replace(':', "%3A")
        )
    }
}

#[async_trait]
impl LlmProvider for BedrockProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let mut request = MessagesRequest::new(messages, config);
        request.anthropic_version = Some(BEDROCK_ANTHROPIC_VERSION);

        let response = self
            .client
            .post(self.invoke_url(&config.model))
            .bearer_auth(self.credential.expose())
            .header("accept", "application/json")
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, error_message(&body)));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        body.into_completion(&config.model)
    }

    fn name(&self) -> &str {
        "bedrock"
    }
}

/// Factory for Bedrock providers.
///
/// ## Configuration Format
/// ```json
/// {
///   "api_key": "...",                 // Optional, falls back to AWS_BEARER_TOKEN_BEDROCK
///   "region": "ap-southeast-2",       // Optional
///   "endpoint": "https://..."         // Optional, overrides the regional endpoint
/// }
/// ```
pub struct BedrockProviderFactory;

impl ProviderFactory for BedrockProviderFactory {
    fn provider_type(&self) -> &'static str {
        "bedrock"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(BedrockProvider::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if !ApiCredential::is_available(config, "api_key", BEDROCK_API_KEY_ENV) {
            return Err(ProviderError::NotConfigured(format!(
                "Bedrock API key required: set 'api_key' in config or {} env",
                BEDROCK_API_KEY_ENV
            )));
        }

        if let Some(url) = config["endpoint"].as_str() {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ProviderError::NotConfigured(
                    "endpoint must start with http:// or https://".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn default_models(&self) -> Vec<String> {
        DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_url_escapes_version_suffix() {
        let provider = BedrockProvider::new("key", "ap-southeast-2");
        assert_eq!(
            provider.invoke_url("apac.anthropic.claude-3-haiku-20240307-v1:0"),
            "https://bedrock-runtime.ap-southeast-2.amazonaws.com/model/apac.anthropic.claude-3-haiku-20240307-v1%3A0/invoke"
        );
    }

    #[test]
    fn test_from_config_region_and_endpoint() {
        let provider = BedrockProvider::from_config(&serde_json::json!({
            "api_key": "key",
            "region": "us-east-1"
        }))
        .unwrap();
        assert_eq!(provider.endpoint, "https://bedrock-runtime.us-east-1.amazonaws.com");

        let provider = BedrockProvider::from_config(&serde_json::json!({
            "api_key": "key",
            "endpoint": "http://127.0.0.1:9000/"
        }))
        .unwrap();
        assert_eq!(provider.endpoint, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_default_models_order() {
        let models = BedrockProviderFactory.default_models();
        assert_eq!(
            models,
            vec![
                "apac.anthropic.claude-3-7-sonnet-20250219-v1:0",
                "apac.anthropic.claude-3-5-sonnet-20241022-v2:0",
                "apac.anthropic.claude-3-haiku-20240307-v1:0",
            ]
        );
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let config = serde_json::json!({ "api_key": "key", "endpoint": "bedrock.local" });
        assert!(BedrockProviderFactory.validate_config(&config).is_err());
    }

    #[test]
    fn test_key_not_in_debug_output() {
        let provider = BedrockProvider::new("bedrock-secret-token", "ap-southeast-2");
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("bedrock-secret-token"));
        assert!(debug.contains("ap-southeast-2"));
    }
}
