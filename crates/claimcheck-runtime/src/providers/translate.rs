//! Machine translation.
//!
//! [`HttpTranslator`] speaks the LibreTranslate JSON API. Language
//! detection is requested by passing `"auto"` as the source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use claimcheck_core::LanguageCode;

use super::{
    messages::error_message,
    secrets::ApiCredential,
    ProviderError,
};

/// Environment variable holding the optional translation API key.
pub const TRANSLATE_API_KEY_ENV: &str = "TRANSLATE_API_KEY";

/// Source value asking the service to detect the language.
pub const AUTO_DETECT: &str = "auto";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Translated text and the language it was translated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub source_language: LanguageCode,
}

/// Language detection and translation.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` (or [`AUTO_DETECT`]) into `target`.
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Translation, ProviderError>;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
    #[serde(default)]
    detected_language: Option<DetectedLanguage>,
}

#[derive(Debug, Deserialize)]
struct DetectedLanguage {
    language: String,
}

/// LibreTranslate-compatible HTTP client.
pub struct HttpTranslator {
    endpoint: String,
    credential: Option<ApiCredential>,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTranslator")
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential)
            .finish()
    }
}

impl HttpTranslator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            credential: None,
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Create for `endpoint`, picking up `TRANSLATE_API_KEY` if set.
    pub fn from_env(endpoint: impl Into<String>) -> Self {
        let mut translator = Self::new(endpoint);
        translator.credential =
            ApiCredential::optional_from_env(TRANSLATE_API_KEY_ENV, "Translation API key");
        translator
    }

    pub fn with_credential(mut self, credential: ApiCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Translation, ProviderError> {
        let request = TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.credential.as_ref().map(|c| c.expose()),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.endpoint))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, error_message(&body)));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(body.into_translation(source))
    }
}

impl TranslateResponse {
    fn into_translation(self, requested_source: &str) -> Translation {
        let source_language = match self.detected_language {
            Some(detected) => LanguageCode::new(detected.language),
            None if requested_source != AUTO_DETECT => LanguageCode::new(requested_source),
            None => {
                debug!("Translator did not report a detected language");
                LanguageCode::english()
            }
        };

        Translation {
            text: self.translated_text,
            source_language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = TranslateRequest {
            q: "你好",
            source: AUTO_DETECT,
            target: "en",
            format: "text",
            api_key: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["source"], "auto");
        assert_eq!(json["format"], "text");
        assert!(json.get("api_key").is_none());
    }

    #[test]
    fn test_detected_language_wins() {
        let response: TranslateResponse = serde_json::from_value(serde_json::json!({
            "translatedText": "The moon landing was faked",
            "detectedLanguage": { "confidence": 92.0, "language": "zh" }
        }))
        .unwrap();
        let translation = response.into_translation(AUTO_DETECT);
        assert_eq!(translation.source_language.as_str(), "zh");
        assert_eq!(translation.text, "The moon landing was faked");
    }

    #[test]
    fn test_explicit_source_without_detection() {
        let response: TranslateResponse =
            serde_json::from_value(serde_json::json!({ "translatedText": "hola" })).unwrap();
        assert_eq!(response.into_translation("en").source_language.as_str(), "en");
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let translator = HttpTranslator::new("http://localhost:5000/");
        assert_eq!(translator.endpoint, "http://localhost:5000");
    }
}
