//! The fact-check pipeline.
//!
//! Stages run strictly in sequence for one request:
//! - Request gate (deterministic, in `claimcheck-core`)
//! - Claim translated into English
//! - Search terms extracted, evidence gathered
//! - Verdict generated over the model chain
//! - Verdict translated back and wrapped in the response envelope
//!
//! Past the gate every stage degrades instead of failing. The only error
//! that reaches the caller as a 500 is a [`RuntimeError`].

use chrono::{NaiveDate, Utc};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use claimcheck_core::{
    extract_search_terms, format_long_date, parse_event, Claim, EvidenceOrigin, LanguageCode,
    Request, ResponseEnvelope, Verdict,
};

use crate::config::{ConfigError, RuntimeConfig};
use crate::normalizer::LanguageNormalizer;
use crate::providers::{
    ApiCredential, BedrockKnowledgeIndex, CompletionConfig, HttpTranslator, KnowledgeIndex,
    LlmProvider, ProviderError, ProviderRegistry, TavilySearch, Translator, WebSearch,
    BEDROCK_API_KEY_ENV,
};
use crate::resilience::ModelChain;
use crate::retriever::EvidenceRetriever;
use crate::verdict::VerdictGenerator;

/// Characters of the claim used as the query when no terms are extracted.
pub const QUERY_FALLBACK_CHARS: usize = 100;

/// Characters of the claim written to logs.
const LOG_PREVIEW_CHARS: usize = 80;

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("No language models configured")]
    NoModels,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Everything a check produced, beyond the response body.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Response body: the verdict in the caller's language.
    pub body: String,

    /// The English verdict and which model produced it.
    pub verdict: Verdict,

    pub source_language: LanguageCode,

    /// Query sent to the knowledge index and live search.
    pub search_terms: String,

    pub evidence_origin: EvidenceOrigin,

    /// A translation step failed and fell back to English.
    pub translation_degraded: bool,
}

/// Runs claims through the pipeline.
pub struct FactChecker {
    normalizer: LanguageNormalizer,
    retriever: EvidenceRetriever,
    generator: VerdictGenerator,
}

impl FactChecker {
    pub fn builder() -> FactCheckerBuilder {
        FactCheckerBuilder::new()
    }

    /// Wire HTTP collaborators from configuration and the environment.
    ///
    /// Live search is enabled only when `TAVILY_API_KEY` is set.
    pub fn from_config(
        config: &RuntimeConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, RuntimeError> {
        let options = config.provider_options();
        registry.validate(&config.llm.provider, &options)?;
        let provider = registry.create(&config.llm.provider, &options)?;

        let models = if config.llm.models.is_empty() {
            registry
                .default_models(&config.llm.provider)
                .unwrap_or_default()
        } else {
            config.llm.models.clone()
        };

        let chain = ModelChain::new(models);
        if chain.is_empty() {
            warn!(provider = %config.llm.provider, "No models configured, every check will fail");
        } else {
            info!(provider = %config.llm.provider, models = ?chain.models(), "Model chain ready");
        }

        let client = reqwest::Client::new();

        let translator = HttpTranslator::from_env(config.translation.endpoint.as_str())
            .with_timeout(config.translation.timeout)
            .with_client(client.clone());

        let knowledge = BedrockKnowledgeIndex::new(
            config.knowledge_base_endpoint(),
            config.knowledge_base_id.as_str(),
        )
        .with_credential(ApiCredential::optional_from_env(
            BEDROCK_API_KEY_ENV,
            "Bedrock API key",
        ))
        .with_timeout(config.knowledge_base.timeout)
        .with_client(client.clone());

        let mut builder = Self::builder()
            .translator(Arc::new(translator))
            .knowledge(Arc::new(knowledge))
            .provider(provider)
            .models(chain)
            .completion(config.completion_config())
            .limits(config.knowledge_base.max_results, config.search.max_results);

        match TavilySearch::from_env() {
            Some(search) => {
                builder = builder.search(Arc::new(
                    search.with_timeout(config.search.timeout).with_client(client),
                ));
            }
            None => warn!("TAVILY_API_KEY not set, live search disabled"),
        }

        builder.build()
    }

    /// Handle one invocation event, dated today (UTC).
    pub async fn handle_event(&self, event: &JsonValue) -> ResponseEnvelope {
        self.handle_event_on(event, Utc::now().date_naive()).await
    }

    /// Handle one invocation event as if run on `today`.
    pub async fn handle_event_on(&self, event: &JsonValue, today: NaiveDate) -> ResponseEnvelope {
        let claim = match parse_event(event) {
            Ok(Request::Preflight) => return ResponseEnvelope::preflight(),
            Ok(Request::Check(claim)) => claim,
            Err(e) => {
                warn!(error = %e, "Rejected request");
                return ResponseEnvelope::rejected(&e);
            }
        };

        info!(date = %format_long_date(today), "Processing request");

        match self.check_on(&claim, today).await {
            Ok(outcome) => ResponseEnvelope::ok(outcome.body),
            Err(e) => {
                error!(error = %e, "Unexpected error while checking claim");
                ResponseEnvelope::internal_error(e.to_string())
            }
        }
    }

    /// Check a validated claim, dated today (UTC).
    pub async fn check(&self, claim: &Claim) -> Result<CheckOutcome, RuntimeError> {
        self.check_on(claim, Utc::now().date_naive()).await
    }

    /// Check a validated claim as if run on `today`.
    pub async fn check_on(&self, claim: &Claim, today: NaiveDate) -> Result<CheckOutcome, RuntimeError> {
        info!(claim = claim.preview(LOG_PREVIEW_CHARS), "Analyzing claim");

        let english = self.normalizer.to_english(claim.as_str()).await;
        let source_language = english.source_language();
        let mut translation_degraded = english.is_degraded();
        if translation_degraded {
            warn!("Continuing with untranslated claim");
        }
        info!(source_language = %source_language, "Detected language");

        let search_terms = search_query(english.text());
        info!(
            date = %format_long_date(today),
            search_terms = %search_terms,
            "Gathering evidence"
        );

        let evidence = self.retriever.gather(&search_terms).await;
        let verdict = self
            .generator
            .generate(english.text(), &evidence, today)
            .await?;

        let body = if source_language.is_english() {
            verdict.text.clone()
        } else {
            let localized = self
                .normalizer
                .localize_verdict(&verdict.text, &source_language)
                .await;
            translation_degraded |= localized.degraded;
            localized.text
        };

        let summary = verdict.summary();
        info!(
            classification = ?summary.classification,
            confidence = summary.confidence,
            trust = %summary.trust,
            fallback = verdict.is_fallback(),
            "Verdict ready"
        );

        Ok(CheckOutcome {
            body,
            verdict,
            source_language,
            search_terms,
            evidence_origin: evidence.origin,
            translation_degraded,
        })
    }
}

/// Extracted terms, or the head of the claim when extraction finds nothing.
pub fn search_query(claim: &str) -> String {
    let terms = extract_search_terms(claim);
    if terms.is_empty() {
        claim.chars().take(QUERY_FALLBACK_CHARS).collect()
    } else {
        terms
    }
}

/// Builder for [`FactChecker`].
pub struct FactCheckerBuilder {
    translator: Option<Arc<dyn Translator>>,
    knowledge: Option<Arc<dyn KnowledgeIndex>>,
    search: Option<Arc<dyn WebSearch>>,
    provider: Option<Arc<dyn LlmProvider>>,
    models: ModelChain,
    completion: CompletionConfig,
    kb_results: usize,
    search_results: usize,
}

impl FactCheckerBuilder {
    pub fn new() -> Self {
        let config = RuntimeConfig::default();
        Self {
            translator: None,
            knowledge: None,
            search: None,
            provider: None,
            models: ModelChain::default(),
            completion: config.completion_config(),
            kb_results: config.knowledge_base.max_results,
            search_results: config.search.max_results,
        }
    }

    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn knowledge(mut self, knowledge: Arc<dyn KnowledgeIndex>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    /// Enable live search. Without it, search falls back to the disclaimer.
    pub fn search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn models(mut self, models: ModelChain) -> Self {
        self.models = models;
        self
    }

    pub fn completion(mut self, completion: CompletionConfig) -> Self {
        self.completion = completion;
        self
    }

    /// Knowledge-index candidates and primary live-search results per request.
    pub fn limits(mut self, kb_results: usize, search_results: usize) -> Self {
        self.kb_results = kb_results;
        self.search_results = search_results;
        self
    }

    pub fn build(self) -> Result<FactChecker, RuntimeError> {
        let translator = self
            .translator
            .ok_or_else(|| RuntimeError::ProviderNotConfigured("No translator set".to_string()))?;
        let knowledge = self
            .knowledge
            .ok_or_else(|| RuntimeError::ProviderNotConfigured("No knowledge index set".to_string()))?;
        let provider = self
            .provider
            .ok_or_else(|| RuntimeError::ProviderNotConfigured("No LLM provider set".to_string()))?;

        Ok(FactChecker {
            normalizer: LanguageNormalizer::new(translator),
            retriever: EvidenceRetriever::new(knowledge, self.search)
                .with_limits(self.kb_results, self.search_results),
            generator: VerdictGenerator::new(provider, self.models, self.completion),
        })
    }
}

impl Default for FactCheckerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
