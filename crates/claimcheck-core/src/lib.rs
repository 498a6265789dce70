//! # claimcheck-core
//!
//! Deterministic building blocks of the claimcheck fact-checking pipeline.
//!
//! This crate answers, without touching the network:
//! - Is this request well-formed, and what claim does it carry?
//! - What should we search for?
//! - Which retrieved evidence qualifies, and how is it presented?
//! - What does the response envelope look like?
//!
//! The runtime crate wires these pieces to translation, knowledge-index,
//! live-search and language-model services.
//!
//! ## Example
//!
//! ```rust,ignore
//! use claimcheck_core::{parse_event, extract_search_terms, Request};
//!
//! let event = serde_json::json!({ "text": "Apple launched the iPhone 16 in 2024" });
//! if let Request::Check(claim) = parse_event(&event)? {
//!     let query = extract_search_terms(claim.as_str());
//! }
//! ```

pub mod evidence;
pub mod language;
pub mod request;
pub mod response;
pub mod terms;
pub mod verdict;

// Re-export main types at crate root
pub use evidence::{
    fallback_search_context, format_knowledge_context, format_live_search, format_supplement,
    select_passages, EvidenceContext, EvidenceOrigin, EvidenceSnippet, KnowledgePassage,
    SearchItem, SearchResults,
};
pub use language::{FromEnglish, LanguageCode, ToEnglish};
pub use request::{parse_event, Claim, GateError, Request, MAX_CLAIM_CHARS, MIN_CLAIM_CHARS};
pub use response::{ResponseEnvelope, CORS_HEADERS};
pub use terms::extract_search_terms;
pub use verdict::{
    fallback_verdict, format_long_date, Classification, TrustLevel, Verdict, VerdictOrigin,
    VerdictSummary,
};
