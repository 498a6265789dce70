//! Search-term extraction.
//!
//! Shapes a free-form claim into a compact query for the knowledge index and
//! live search. The patterns below are applied in order; every match of
//! every pattern is collected, deduplicated in first-seen order and capped
//! at [`MAX_TERMS`].
//!
//! Every pattern is case-insensitive, so the phrase pattern matches any run
//! of words and an ordinary sentence comes back whole. When no pattern
//! matches, the claim falls back to plain keyword tokenisation: lowercase,
//! drop stop words and tokens of two characters or fewer, keep the first
//! [`MAX_FALLBACK_TOKENS`].

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Upper bound on extracted terms.
pub const MAX_TERMS: usize = 10;

/// Upper bound on tokens produced by the stop-word fallback.
pub const MAX_FALLBACK_TOKENS: usize = 8;

const STOP_WORDS: &[&str] = &[
    "has", "the", "been", "is", "are", "was", "were", "a", "an", "and", "or", "but", "yet",
    "still", "will", "would", "could", "should",
];

lazy_static! {
    /// Brands and named organisations, with the word that follows.
    static ref ENTITY_PATTERN: Regex = Regex::new(
        r"(?i)\b(?:iPhone|Samsung|Google|Apple|Microsoft|Tesla|Amazon|Facebook|Twitter|Meta)\s*\w*\b"
    ).unwrap();

    /// Topics that dominate misinformation traffic.
    static ref TOPIC_PATTERN: Regex = Regex::new(
        r"(?i)\b(?:COVID|coronavirus|pandemic|vaccine|climate|election|war|Ukraine|Russia|China)\b"
    ).unwrap();

    /// Office or institution followed by a name.
    static ref ROLE_PATTERN: Regex = Regex::new(
        r"(?i)\b(?:President|Prime Minister|CEO|government|Congress|Parliament)\s+\w+\b"
    ).unwrap();

    /// Four-digit years and other four-digit numbers.
    static ref YEAR_PATTERN: Regex = Regex::new(r"\b\d{4}\b").unwrap();

    /// Reporting verbs.
    static ref ACTION_PATTERN: Regex = Regex::new(
        r"(?i)\b(?:released?|launched?|announced?|confirmed?|reported?|said|claims?)\b"
    ).unwrap();

    /// Runs of words of two or more letters.
    static ref CAPITALIZED_PHRASE_PATTERN: Regex = Regex::new(
        r"(?i)\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b"
    ).unwrap();

    static ref PATTERNS: [&'static Regex; 6] = [
        &*ENTITY_PATTERN,
        &*TOPIC_PATTERN,
        &*ROLE_PATTERN,
        &*YEAR_PATTERN,
        &*ACTION_PATTERN,
        &*CAPITALIZED_PHRASE_PATTERN,
    ];
}

/// Extract a space-joined search query from claim text.
///
/// Returns an empty string only when the claim has no usable tokens at all.
pub fn extract_search_terms(text: &str) -> String {
    let text = text.trim();
    let terms = pattern_terms(text);

    if terms.is_empty() {
        return fallback_terms(text).join(" ");
    }

    terms.join(" ")
}

/// All pattern matches in pattern order, deduplicated, capped at [`MAX_TERMS`].
fn pattern_terms(text: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    PATTERNS
        .iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .map(|m| m.as_str().trim())
        .filter(|term| !term.is_empty() && seen.insert(*term))
        .take(MAX_TERMS)
        .collect()
}

fn fallback_terms(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word) && word.chars().count() > 2)
        .take(MAX_FALLBACK_TOKENS)
        .map(str::to_string)
        .collect()
}
