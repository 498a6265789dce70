//! Runtime configuration.
//!
//! Loaded from an optional YAML file, then overridden by environment
//! variables. Durations are human-readable (`"6s"`, `"1m 30s"`).
//! Credentials are never part of this struct.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::providers::{agent_runtime_endpoint, CompletionConfig, DEFAULT_SEARCH_TIMEOUT};

/// Errors loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Cloud region for the default endpoints.
    pub region: String,

    pub knowledge_base_id: String,

    pub knowledge_base: KnowledgeBaseConfig,

    pub search: SearchConfig,

    pub translation: TranslationConfig,

    pub llm: LlmConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            region: "ap-southeast-2".to_string(),
            knowledge_base_id: "OFLYCZAWWQ".to_string(),
            knowledge_base: KnowledgeBaseConfig::default(),
            search: SearchConfig::default(),
            translation: TranslationConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    /// Overrides the regional agent-runtime endpoint.
    pub endpoint: Option<String>,

    /// Candidates requested per lookup.
    pub max_results: usize,

    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            max_results: 8,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results requested when search is the primary evidence source.
    pub max_results: usize,

    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 4,
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub endpoint: String,

    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Registered provider type, e.g. `bedrock` or `anthropic`.
    pub provider: String,

    /// Fallback chain; empty means the provider's defaults.
    pub models: Vec<String>,

    /// Overrides the provider's default endpoint.
    pub endpoint: Option<String>,

    pub max_tokens: u32,

    pub temperature: f32,

    /// Per-model request timeout.
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "bedrock".to_string(),
            models: Vec::new(),
            endpoint: None,
            max_tokens: 700,
            temperature: 0.1,
            timeout: Duration::from_secs(30),
        }
    }
}

impl RuntimeConfig {
    /// Parse from YAML text. Missing keys take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply environment-style overrides from `lookup`. Blank values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = v.to_lowercase();
        }
        if let Some(v) = get("AWS_REGION") {
            self.region = v;
        }
        if let Some(v) = get("KNOWLEDGE_BASE_ID") {
            self.knowledge_base_id = v;
        }
        if let Some(v) = get("KNOWLEDGE_BASE_ENDPOINT") {
            self.knowledge_base.endpoint = Some(v);
        }
        if let Some(v) = get("TRANSLATE_ENDPOINT") {
            self.translation.endpoint = v;
        }
        if let Some(v) = get("LLM_PROVIDER") {
            self.llm.provider = v;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.knowledge_base_id.trim().is_empty() {
            return Err(ConfigError::invalid("knowledge_base_id", "must not be empty"));
        }
        if self.knowledge_base.max_results == 0 {
            return Err(ConfigError::invalid("knowledge_base.max_results", "must be at least 1"));
        }
        if self.search.max_results == 0 {
            return Err(ConfigError::invalid("search.max_results", "must be at least 1"));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::invalid("llm.max_tokens", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.llm.temperature) {
            return Err(ConfigError::invalid(
                "llm.temperature",
                format!("{} is outside 0.0..=1.0", self.llm.temperature),
            ));
        }
        if self.llm.provider.trim().is_empty() {
            return Err(ConfigError::invalid("llm.provider", "must not be empty"));
        }
        Ok(())
    }

    /// Knowledge index endpoint, derived from the region unless overridden.
    pub fn knowledge_base_endpoint(&self) -> String {
        self.knowledge_base
            .endpoint
            .clone()
            .unwrap_or_else(|| agent_runtime_endpoint(&self.region))
    }

    /// Completion settings shared by every model in the chain.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.llm.models.first().cloned().unwrap_or_default(),
            max_tokens: self.llm.max_tokens,
            temperature: self.llm.temperature,
            timeout: self.llm.timeout,
        }
    }

    /// JSON options handed to the provider factory.
    pub fn provider_options(&self) -> serde_json::Value {
        let mut options = serde_json::json!({ "region": self.region });
        if let Some(endpoint) = &self.llm.endpoint {
            options["endpoint"] = serde_json::Value::String(endpoint.clone());
            options["base_url"] = serde_json::Value::String(endpoint.clone());
        }
        options
    }
}

/// Serde adapter for human-readable durations.
mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
