//! Evidence selection and context formatting.
//!
//! Knowledge-index passages and live-search items arrive here as plain data.
//! This module decides which of them qualify, how they are truncated and
//! how they are rendered into the evidence context embedded in the verdict
//! prompt. Nothing here performs I/O.

use serde::{Deserialize, Serialize};

/// Passages scoring at or below this are discarded.
pub const MIN_PASSAGE_SCORE: f64 = 0.4;

/// Passages of this many characters or fewer are discarded.
pub const MIN_PASSAGE_CHARS: usize = 30;

/// At most this many knowledge-index passages reach the prompt.
pub const MAX_KB_PASSAGES: usize = 4;

/// Snippet text is truncated to this many characters.
pub const SNIPPET_CHARS: usize = 500;

/// Locator used when the index returns a passage without one.
pub const INTERNAL_SOURCE: &str = "Internal KB";

/// Banner opening a knowledge-index context.
pub const KB_BANNER: &str = "**AUTHORITATIVE KNOWLEDGE BASE INFORMATION:**";

/// Header of the supplementary live-search section.
pub const SUPPLEMENT_HEADER: &str = "**SUPPLEMENTARY LIVE SEARCH** (for additional context only):";

/// Header of a primary live-search context.
pub const LIVE_SEARCH_HEADER: &str = "**LIVE SEARCH RESULTS:**";

/// A candidate passage returned by the knowledge index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgePassage {
    pub text: String,
    pub score: f64,
    /// Source locator, e.g. an object-store URI.
    pub source: String,
}

impl KnowledgePassage {
    pub fn new(text: impl Into<String>, score: f64, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            score,
            source: source.into(),
        }
    }

    /// Whether this passage may be used as evidence.
    pub fn qualifies(&self) -> bool {
        let text = self.text.trim();
        !text.is_empty() && self.score > MIN_PASSAGE_SCORE && text.chars().count() > MIN_PASSAGE_CHARS
    }
}

/// A qualified, truncated piece of evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSnippet {
    /// At most [`SNIPPET_CHARS`] characters plus an ellipsis.
    pub text: String,
    pub confidence: f64,
    pub source: String,
}

impl EvidenceSnippet {
    /// Last path segment of the source locator.
    pub fn source_name(&self) -> &str {
        self.source.rsplit('/').next().unwrap_or(&self.source)
    }
}

/// Filter, rank and truncate knowledge-index candidates.
///
/// Keeps passages that [qualify](KnowledgePassage::qualifies), orders them
/// by score descending and returns at most [`MAX_KB_PASSAGES`].
pub fn select_passages(candidates: Vec<KnowledgePassage>) -> Vec<EvidenceSnippet> {
    let mut qualified: Vec<KnowledgePassage> =
        candidates.into_iter().filter(KnowledgePassage::qualifies).collect();

    qualified.sort_by(|a, b| b.score.total_cmp(&a.score));

    qualified
        .into_iter()
        .take(MAX_KB_PASSAGES)
        .map(|p| {
            let text = p.text.trim();
            EvidenceSnippet {
                text: truncate_with_ellipsis(text, SNIPPET_CHARS),
                confidence: p.score,
                source: p.source,
            }
        })
        .collect()
}

/// Render selected snippets as the authoritative context block.
pub fn format_knowledge_context(snippets: &[EvidenceSnippet]) -> String {
    let blocks: Vec<String> = snippets
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "**KB Source {}** (Confidence: {:.2}, Source: {}): {}",
                i + 1,
                s.confidence,
                s.source_name(),
                s.text
            )
        })
        .collect();

    format!("{}\n{}", KB_BANNER, blocks.join("\n\n"))
}

/// Note placed above the evidence when the knowledge index contributed.
pub fn authority_note(source_count: usize) -> String {
    format!(
        "**PRIORITY SOURCE**: Knowledge Base contains {} relevant authoritative sources. \
         Use this as the primary basis for analysis.",
        source_count
    )
}

/// A ranked live-search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub title: String,
    /// Page excerpt; some providers call this `snippet`.
    #[serde(default, alias = "snippet")]
    pub content: String,
    #[serde(default)]
    pub url: String,
}

/// Live-search results plus the provider's synthesized answer, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchItem>,
}

/// Items rendered in a supplementary section.
pub const SUPPLEMENT_ITEMS: usize = 2;
const SUPPLEMENT_EXCERPT_CHARS: usize = 200;

/// Items rendered in a primary live-search context.
pub const PRIMARY_ITEMS: usize = 5;
const PRIMARY_EXCERPT_CHARS: usize = 300;

fn format_items(items: &[SearchItem], limit: usize, excerpt_chars: usize) -> Vec<String> {
    items
        .iter()
        .take(limit)
        .filter(|item| !item.title.is_empty() && !item.content.is_empty())
        .map(|item| {
            format!(
                "• **{}**: {}... ({})",
                item.title,
                take_chars(&item.content, excerpt_chars),
                item.url
            )
        })
        .collect()
}

/// Supplementary section appended after a knowledge-index context.
///
/// Returns `None` when no item has both a title and content.
pub fn format_supplement(results: &SearchResults) -> Option<String> {
    let lines = format_items(&results.results, SUPPLEMENT_ITEMS, SUPPLEMENT_EXCERPT_CHARS);
    if lines.is_empty() {
        return None;
    }
    Some(format!("\n\n{}\n{}", SUPPLEMENT_HEADER, lines.join("\n")))
}

/// Primary context built from a live search when the index had nothing.
///
/// Returns `None` when no item is usable; the caller then substitutes
/// [`fallback_search_context`].
pub fn format_live_search(results: &SearchResults) -> Option<String> {
    let lines = format_items(&results.results, PRIMARY_ITEMS, PRIMARY_EXCERPT_CHARS);
    if lines.is_empty() {
        return None;
    }

    let context = format!("{}\n{}", LIVE_SEARCH_HEADER, lines.join("\n"));
    match results.answer.as_deref().filter(|a| !a.is_empty()) {
        Some(answer) => Some(format!("**AI Search Summary:** {}\n\n{}", answer, context)),
        None => Some(context),
    }
}

/// Disclaimer used as evidence when live search is unavailable.
pub fn fallback_search_context(query: &str) -> String {
    format!(
        "**Search Status**: Unable to perform live web search for current information about: \"{}\"\n\n\
         **Note**: Analysis will be based on general knowledge and patterns, but may not reflect \
         the most recent developments. For claims about recent events, product releases, or \
         breaking news, verification from current reliable sources is recommended.",
        query
    )
}

/// Where the evidence context came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvidenceOrigin {
    /// The knowledge index supplied `sources` passages.
    KnowledgeBase { sources: usize, supplemented: bool },

    /// Live search supplied the primary context.
    LiveSearch,

    /// Neither path produced evidence; the context is a disclaimer.
    Unavailable,
}

/// Evidence context ready for prompt assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceContext {
    pub text: String,
    pub origin: EvidenceOrigin,
}

impl EvidenceContext {
    /// Authority note for the prompt; empty unless the index contributed.
    pub fn authority_note(&self) -> String {
        match self.origin {
            EvidenceOrigin::KnowledgeBase { sources, .. } => authority_note(sources),
            _ => String::new(),
        }
    }
}

fn take_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let head = take_chars(text, max_chars);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LONG_TEXT: &str = "The Apollo 11 mission landed on the Moon on July 20, 1969.";

    #[test]
    fn test_filters_low_scores_and_short_text() {
        let snippets = select_passages(vec![
            KnowledgePassage::new(LONG_TEXT, 0.4, "s3://kb/a.pdf"),
            KnowledgePassage::new("too short", 0.9, "s3://kb/b.pdf"),
            KnowledgePassage::new("   ", 0.9, "s3://kb/c.pdf"),
            KnowledgePassage::new(LONG_TEXT, 0.41, "s3://kb/d.pdf"),
        ]);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].source, "s3://kb/d.pdf");
    }

    #[test]
    fn test_sorted_and_capped() {
        let candidates = (0..6)
            .map(|i| KnowledgePassage::new(LONG_TEXT, 0.5 + i as f64 * 0.05, format!("doc{}", i)))
            .collect();
        let snippets = select_passages(candidates);
        assert_eq!(snippets.len(), MAX_KB_PASSAGES);
        assert_eq!(snippets[0].source, "doc5");
        assert_eq!(snippets[3].source, "doc2");
    }

    #[test]
    fn test_truncation_appends_ellipsis() {
        let long = "a".repeat(SNIPPET_CHARS + 10);
        let snippets = select_passages(vec![KnowledgePassage::new(long, 0.9, INTERNAL_SOURCE)]);
        assert_eq!(snippets[0].text.chars().count(), SNIPPET_CHARS + 3);
        assert!(snippets[0].text.ends_with("..."));

        let exact = "b".repeat(SNIPPET_CHARS);
        let snippets = select_passages(vec![KnowledgePassage::new(exact.clone(), 0.9, INTERNAL_SOURCE)]);
        assert_eq!(snippets[0].text, exact);
    }

    #[test]
    fn test_knowledge_context_format() {
        let snippets = select_passages(vec![
            KnowledgePassage::new(LONG_TEXT, 0.873, "s3://bucket/apollo/mission.pdf"),
            KnowledgePassage::new(LONG_TEXT, 0.6, INTERNAL_SOURCE),
        ]);
        let context = format_knowledge_context(&snippets);
        assert!(context.starts_with(KB_BANNER));
        assert!(context.contains("**KB Source 1** (Confidence: 0.87, Source: mission.pdf): The Apollo"));
        assert!(context.contains("\n\n**KB Source 2** (Confidence: 0.60, Source: Internal KB)"));
    }

    #[test]
    fn test_authority_note_only_for_knowledge_base() {
        let kb = EvidenceContext {
            text: String::new(),
            origin: EvidenceOrigin::KnowledgeBase { sources: 3, supplemented: false },
        };
        assert!(kb.authority_note().contains("contains 3 relevant authoritative sources"));

        let live = EvidenceContext { text: String::new(), origin: EvidenceOrigin::LiveSearch };
        assert!(live.authority_note().is_empty());
    }

    fn item(title: &str, content: &str) -> SearchItem {
        SearchItem {
            title: title.to_string(),
            content: content.to_string(),
            url: format!("https://apnews.com/{}", title.to_lowercase()),
        }
    }

    #[test]
    fn test_supplement_skips_incomplete_items() {
        let results = SearchResults {
            answer: None,
            results: vec![item("", "no title"), item("Moon", "Apollo landed"), item("Extra", "third")],
        };
        let section = format_supplement(&results).unwrap();
        assert!(section.starts_with("\n\n**SUPPLEMENTARY LIVE SEARCH**"));
        assert!(section.contains("• **Moon**: Apollo landed... (https://apnews.com/moon)"));
        // Only the first two items are considered.
        assert!(!section.contains("Extra"));
    }

    #[test]
    fn test_supplement_none_when_unusable() {
        let results = SearchResults { answer: None, results: vec![item("Only title", "")] };
        assert!(format_supplement(&results).is_none());
    }

    #[test]
    fn test_live_search_with_answer() {
        let results = SearchResults {
            answer: Some("The landing was real.".to_string()),
            results: vec![item("Moon", &"x".repeat(400))],
        };
        let context = format_live_search(&results).unwrap();
        assert!(context.starts_with("**AI Search Summary:** The landing was real.\n\n**LIVE SEARCH RESULTS:**"));
        assert!(context.contains(&format!("{}...", "x".repeat(300))));
        assert!(!context.contains(&"x".repeat(301)));
    }

    #[test]
    fn test_live_search_without_items() {
        let results = SearchResults { answer: Some("answer".to_string()), results: vec![] };
        assert!(format_live_search(&results).is_none());
    }

    #[test]
    fn test_fallback_context_mentions_query() {
        let context = fallback_search_context("moon landing faked");
        assert!(context.starts_with("**Search Status**"));
        assert!(context.contains("\"moon landing faked\""));
        assert!(context.contains("general knowledge"));
    }

    #[test]
    fn test_search_item_snippet_alias() {
        let item: SearchItem =
            serde_json::from_value(serde_json::json!({ "title": "T", "snippet": "S", "url": "U" })).unwrap();
        assert_eq!(item.content, "S");
    }

    proptest! {
        #[test]
        fn prop_selected_passages_qualify(
            candidates in proptest::collection::vec(("[a-z ]{0,80}", 0.0f64..1.0), 0..12)
        ) {
            let passages: Vec<_> = candidates
                .iter()
                .map(|(text, score)| KnowledgePassage::new(text.clone(), *score, INTERNAL_SOURCE))
                .collect();
            let snippets = select_passages(passages);

            prop_assert!(snippets.len() <= MAX_KB_PASSAGES);
            for s in &snippets {
                prop_assert!(s.confidence > MIN_PASSAGE_SCORE);
                prop_assert!(s.text.chars().count() > MIN_PASSAGE_CHARS);
            }
            for pair in snippets.windows(2) {
                prop_assert!(pair[0].confidence >= pair[1].confidence);
            }
        }
    }
}
