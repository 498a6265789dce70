//! # claimcheck-runtime
//!
//! The networked half of claimcheck: translation, evidence retrieval and
//! verdict generation, wired into the [`FactChecker`] pipeline.
//!
//! Everything deterministic (request validation, term extraction, evidence
//! formatting, the response envelope) lives in `claimcheck-core`. This crate
//! adds the external collaborators behind traits, so the pipeline runs the
//! same against real HTTP services or test doubles.
//!
//! ## Example
//!
//! ```rust,ignore
//! use claimcheck_runtime::{FactChecker, ProviderRegistry, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_env()?;
//! let checker = FactChecker::from_config(&config, &ProviderRegistry::with_defaults())?;
//!
//! let envelope = checker
//!     .handle_event(&serde_json::json!({ "text": "The moon landing was faked" }))
//!     .await;
//! println!("{}", envelope.body);
//! ```

pub mod config;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod resilience;
pub mod retriever;
pub mod verdict;

pub use config::{ConfigError, RuntimeConfig};
pub use normalizer::{translation_disclaimer, LanguageNormalizer, LocalizedText};
pub use orchestrator::{search_query, CheckOutcome, FactChecker, FactCheckerBuilder, RuntimeError};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, KnowledgeIndex, LlmProvider, ProviderError,
    ProviderRegistry, Translation, Translator, WebSearch,
};
pub use resilience::{FallbackError, ModelChain};
pub use retriever::EvidenceRetriever;
pub use verdict::VerdictGenerator;
