//! Ordered model fallback.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// One failed attempt in a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFailure {
    pub model: String,
    pub error: String,
}

impl fmt::Display for ModelFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.model, self.error)
    }
}

/// Why a chain produced no result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FallbackError {
    #[error("No models configured")]
    Empty,

    #[error("All {} models failed", failures.len())]
    Exhausted { failures: Vec<ModelFailure> },
}

/// Model identifiers tried in order, strongest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelChain {
    models: Vec<String>,
}

impl ModelChain {
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: models.into_iter().map(Into::into).collect(),
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Run `attempt` against each model in order and return the first success
    /// together with the model that produced it.
    ///
    /// Attempts are sequential; a model is only tried after the previous one
    /// failed. Each failure is logged and recorded.
    pub async fn first_success<T, E, F, Fut>(
        &self,
        mut attempt: F,
    ) -> Result<(String, T), FallbackError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        if self.models.is_empty() {
            return Err(FallbackError::Empty);
        }

        let mut failures = Vec::with_capacity(self.models.len());

        for model in &self.models {
            info!(model = %model, "Calling model");
            match attempt(model.clone()).await {
                Ok(value) => return Ok((model.clone(), value)),
                Err(e) => {
                    warn!(model = %model, error = %e, "Model failed");
                    failures.push(ModelFailure {
                        model: model.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Err(FallbackError::Exhausted { failures })
    }
}
