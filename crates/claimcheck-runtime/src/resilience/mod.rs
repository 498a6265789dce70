//! Resilience patterns for claimcheck-runtime.
//!
//! Only ordered model fallback is provided: a request tries each model in
//! turn and stops at the first success. There is no retry or backoff.

mod fallback;

pub use fallback::{FallbackError, ModelChain, ModelFailure};
