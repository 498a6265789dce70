//! Language codes and translation outcomes.
//!
//! English is the working language of the pipeline. Translation failures
//! degrade to pass-through, but the outcome types keep the degradation
//! visible so callers can tell a failed translation from English input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An ISO-style language code such as `en`, `zh` or `pt-PT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_string())
    }

    /// The pipeline's working language.
    pub fn english() -> Self {
        Self("en".to_string())
    }

    pub fn is_english(&self) -> bool {
        self.0.eq_ignore_ascii_case("en")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of bringing a claim into English.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToEnglish {
    /// Detected as English; text returned by the translator.
    AlreadyEnglish(String),

    /// Translated from `source`.
    Translated { text: String, source: LanguageCode },

    /// The translator failed; the original text is passed through.
    Failed { original: String },
}

impl ToEnglish {
    /// Text the rest of the pipeline works on.
    pub fn text(&self) -> &str {
        match self {
            Self::AlreadyEnglish(text) => text,
            Self::Translated { text, .. } => text,
            Self::Failed { original } => original,
        }
    }

    /// Language the verdict is translated back into. Failures route as English.
    pub fn source_language(&self) -> LanguageCode {
        match self {
            Self::Translated { source, .. } => source.clone(),
            _ => LanguageCode::english(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of translating English text into a target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromEnglish {
    /// Target was English; no call was made.
    Unchanged(String),

    Translated(String),

    /// The translator failed; the English text is passed through.
    Failed(String),
}

impl FromEnglish {
    pub fn into_text(self) -> String {
        match self {
            Self::Unchanged(text) | Self::Translated(text) | Self::Failed(text) => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_detection() {
        assert!(LanguageCode::english().is_english());
        assert!(LanguageCode::new(" EN ").is_english());
        assert!(!LanguageCode::new("zh").is_english());
        assert!(!LanguageCode::new("en-GB").is_english());
    }

    #[test]
    fn test_failed_routes_as_english() {
        let outcome = ToEnglish::Failed { original: "Bonjour".to_string() };
        assert_eq!(outcome.text(), "Bonjour");
        assert!(outcome.source_language().is_english());
        assert!(outcome.is_degraded());
    }

    #[test]
    fn test_translated_keeps_source() {
        let outcome = ToEnglish::Translated {
            text: "Hello".to_string(),
            source: LanguageCode::new("fr"),
        };
        assert_eq!(outcome.text(), "Hello");
        assert_eq!(outcome.source_language().as_str(), "fr");
        assert!(!outcome.is_degraded());
    }

    #[test]
    fn test_from_english_text() {
        assert_eq!(FromEnglish::Failed("x".to_string()).into_text(), "x");
        assert!(FromEnglish::Failed("x".to_string()).is_degraded());
        assert!(!FromEnglish::Unchanged("x".to_string()).is_degraded());
    }
}
