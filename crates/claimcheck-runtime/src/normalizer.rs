//! Language normalization around the English-only core.
//!
//! Translation failures never fail the request: the text passes through
//! unchanged and the outcome is tagged as degraded.

use std::sync::Arc;
use tracing::{error, info};

use claimcheck_core::{FromEnglish, LanguageCode, ToEnglish};

use crate::providers::{Translator, AUTO_DETECT};

/// Disclaimer appended to a verdict that was translated back from English.
pub fn translation_disclaimer(target: &LanguageCode) -> String {
    format!(
        "_(This analysis was translated into English for processing and then back into {}; \
         the result may be slightly imprecise.)_",
        target.as_str().to_uppercase()
    )
}

/// A verdict rendered in the caller's language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedText {
    pub text: String,
    /// At least one translation fell back to English.
    pub degraded: bool,
}

/// Brings claims into English and verdicts back out.
pub struct LanguageNormalizer {
    translator: Arc<dyn Translator>,
}

impl LanguageNormalizer {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// Detect the claim's language and translate it to English.
    pub async fn to_english(&self, text: &str) -> ToEnglish {
        match self.translator.translate(text, AUTO_DETECT, "en").await {
            Ok(translation) if translation.source_language.is_english() => {
                ToEnglish::AlreadyEnglish(translation.text)
            }
            Ok(translation) => {
                info!(source_language = %translation.source_language, "Translated claim to English");
                ToEnglish::Translated {
                    text: translation.text,
                    source: translation.source_language,
                }
            }
            Err(e) => {
                error!(error = %e, "Translation to English failed");
                ToEnglish::Failed {
                    original: text.to_string(),
                }
            }
        }
    }

    /// Translate English text into `target`. English targets make no call.
    pub async fn from_english(&self, text: &str, target: &LanguageCode) -> FromEnglish {
        if target.is_english() {
            return FromEnglish::Unchanged(text.to_string());
        }

        match self.translator.translate(text, "en", target.as_str()).await {
            Ok(translation) => {
                info!(target_language = %target, "Translated output from English");
                FromEnglish::Translated(translation.text)
            }
            Err(e) => {
                error!(target_language = %target, error = %e, "Translation from English failed");
                FromEnglish::Failed(text.to_string())
            }
        }
    }

    /// Translate a verdict into `target` and append the translated disclaimer.
    ///
    /// English targets return the verdict untouched with no disclaimer.
    pub async fn localize_verdict(&self, verdict: &str, target: &LanguageCode) -> LocalizedText {
        if target.is_english() {
            return LocalizedText {
                text: verdict.to_string(),
                degraded: false,
            };
        }

        info!(target_language = %target, "Translating verdict back to source language");
        let body = self.from_english(verdict, target).await;
        let note = self
            .from_english(&translation_disclaimer(target), target)
            .await;

        let degraded = body.is_degraded() || note.is_degraded();
        LocalizedText {
            text: format!("{}\n\n{}", body.into_text(), note.into_text()),
            degraded,
        }
    }
}
