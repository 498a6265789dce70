//! Verdict generation over the model fallback chain.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info};

use claimcheck_core::{fallback_verdict, EvidenceContext, Verdict, VerdictOrigin};

use crate::orchestrator::RuntimeError;
use crate::prompts::verdict_prompt;
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider};
use crate::resilience::{FallbackError, ModelChain};

/// Asks each model in turn for a verdict.
///
/// When every model fails the hardcoded fallback verdict is returned, so
/// the only error is a chain with no models at all.
pub struct VerdictGenerator {
    provider: Arc<dyn LlmProvider>,
    chain: ModelChain,
    completion: CompletionConfig,
}

impl VerdictGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, chain: ModelChain, completion: CompletionConfig) -> Self {
        Self {
            provider,
            chain,
            completion,
        }
    }

    pub async fn generate(
        &self,
        claim: &str,
        evidence: &EvidenceContext,
        today: NaiveDate,
    ) -> Result<Verdict, RuntimeError> {
        let messages = vec![ChatMessage::user(verdict_prompt(claim, evidence, today))];

        let result = self
            .chain
            .first_success(|model| {
                let config = self.completion.for_model(model);
                let messages = messages.clone();
                let provider = Arc::clone(&self.provider);
                async move { provider.complete(messages, &config).await }
            })
            .await;

        match result {
            Ok((model, response)) => {
                info!(
                    provider = self.provider.name(),
                    model = %model,
                    tokens = response.usage.total(),
                    "AI analysis completed"
                );
                Ok(Verdict {
                    text: response.content,
                    origin: VerdictOrigin::Model { model },
                })
            }
            Err(FallbackError::Empty) => Err(RuntimeError::NoModels),
            Err(FallbackError::Exhausted { failures }) => {
                error!(attempts = failures.len(), "All models failed, using fallback verdict");
                Ok(Verdict {
                    text: fallback_verdict(today),
                    origin: VerdictOrigin::Fallback,
                })
            }
        }
    }
}
