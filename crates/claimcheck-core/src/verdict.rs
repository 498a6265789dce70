//! Verdict types.
//!
//! The model's answer is passed through verbatim. [`VerdictSummary`] reads
//! the classification and confidence back out of it on a best-effort basis
//! for display and logging; it never alters or validates the verdict text.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of verdict labels a model is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    True,
    LikelyTrue,
    LikelyFalse,
    False,
    PartiallyTrue,
    Unverifiable,
}

impl Classification {
    /// All labels, in the order they are presented to the model.
    pub const ALL: [Classification; 6] = [
        Classification::True,
        Classification::LikelyTrue,
        Classification::LikelyFalse,
        Classification::False,
        Classification::PartiallyTrue,
        Classification::Unverifiable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::True => "True",
            Self::LikelyTrue => "Likely True",
            Self::LikelyFalse => "Likely False",
            Self::False => "False",
            Self::PartiallyTrue => "Partially True",
            Self::Unverifiable => "Unverifiable",
        }
    }

    /// One-line guidance shown to the model next to the label.
    pub fn guidance(self) -> &'static str {
        match self {
            Self::True => "Concrete evidence that supports the claim",
            Self::LikelyTrue => "Strong evidence supports the claim",
            Self::LikelyFalse => "Evidence contradicts or undermines the claim",
            Self::False => "Concrete evidence that debunks the claim",
            Self::PartiallyTrue => "Claim has elements of truth but is misleading/incomplete",
            Self::Unverifiable => "Insufficient reliable evidence to make a determination",
        }
    }

    /// Match a label case-insensitively, ignoring quotes and surrounding markup.
    pub fn from_label(raw: &str) -> Option<Self> {
        let cleaned = raw
            .trim()
            .trim_matches(|c: char| c == '*' || c == '"' || c == '[' || c == ']' || c == '.')
            .trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(cleaned))
    }

    /// Labels that call the claim false.
    pub fn is_false(self) -> bool {
        matches!(self, Self::False | Self::LikelyFalse)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Long-form date used in prompts and the fallback verdict, e.g. `October 18, 2026`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Verdict returned when every model in the chain failed.
pub fn fallback_verdict(date: NaiveDate) -> String {
    format!(
        "**Classification:** Unverifiable\n\n\
         **Confidence Percentage:** 50%\n\n\
         **Reasoning:**\n\
         Unable to complete AI analysis due to technical issues with all available models. \
         Please try again later or verify this information through reliable news sources manually. \
         Analysis was attempted on {}.",
        format_long_date(date)
    )
}

/// Which path produced the verdict text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerdictOrigin {
    /// A model answered; `model` is its identifier.
    Model { model: String },

    /// All models failed; the text is [`fallback_verdict`].
    Fallback,
}

/// Raw verdict text plus its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub text: String,
    pub origin: VerdictOrigin,
}

impl Verdict {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, VerdictOrigin::Fallback)
    }

    pub fn summary(&self) -> VerdictSummary {
        VerdictSummary::parse(&self.text)
    }
}

/// Confidence assumed when the model omits one.
pub const DEFAULT_CONFIDENCE: u8 = 50;

/// Coarse trust rating derived from classification and confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    High,
    Medium,
    Low,
}

impl TrustLevel {
    /// At 80% or more the label decides: High unless it calls the claim
    /// false. A missing label counts as not false. Medium needs 60%.
    pub fn rate(classification: Option<Classification>, confidence: u8) -> Self {
        let is_false = classification.map_or(false, Classification::is_false);
        match confidence {
            c if c >= 80 && !is_false => Self::High,
            c if c >= 80 => Self::Low,
            c if c >= 60 => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High Trust"),
            Self::Medium => write!(f, "Medium Trust"),
            Self::Low => write!(f, "Low Trust"),
        }
    }
}

lazy_static! {
    static ref CLASSIFICATION_LINE: Regex =
        Regex::new(r"(?i)(?:\*\*)?Classification:(?:\*\*)?[ \t]*([^\n]+)").unwrap();

    static ref CONFIDENCE_LINE: Regex =
        Regex::new(r"(?i)(?:\*\*)?Confidence Percentage:(?:\*\*)?[ \t]*\[?(\d{1,3})\]?\s*%").unwrap();

    static ref REASONING_SECTION: Regex =
        Regex::new(r"(?is)(?:\*\*)?Reasoning:(?:\*\*)?(.*)$").unwrap();
}

/// Fields read back out of a verdict text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictSummary {
    /// `None` when no known label was found.
    pub classification: Option<Classification>,
    /// Clamped to 0..=100; [`DEFAULT_CONFIDENCE`] when absent.
    pub confidence: u8,
    pub reasoning: Option<String>,
    pub trust: TrustLevel,
}

impl VerdictSummary {
    pub fn parse(text: &str) -> Self {
        let classification = CLASSIFICATION_LINE
            .captures(text)
            .and_then(|c| Classification::from_label(&c[1]));

        let confidence = CONFIDENCE_LINE
            .captures(text)
            .and_then(|c| c[1].parse::<u16>().ok())
            .map(|c| c.min(100) as u8)
            .unwrap_or(DEFAULT_CONFIDENCE);

        let reasoning = REASONING_SECTION
            .captures(text)
            .map(|c| c[1].trim().to_string())
            .filter(|r| !r.is_empty());

        Self {
            classification,
            confidence,
            reasoning,
            trust: TrustLevel::rate(classification, confidence),
        }
    }
}
