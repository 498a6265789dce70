//! Evidence retrieval: knowledge index first, live search second.
//!
//! Every failure degrades. A failed index lookup counts as "nothing found",
//! a failed supplement is omitted, and a failed primary search yields the
//! fallback disclaimer.

use std::sync::Arc;
use tracing::{error, info, warn};

use claimcheck_core::evidence::{
    fallback_search_context, format_knowledge_context, format_live_search, format_supplement,
    select_passages, EvidenceContext, EvidenceOrigin, EvidenceSnippet, SUPPLEMENT_ITEMS,
};

use crate::providers::{KnowledgeIndex, WebSearch};

/// Candidates requested from the knowledge index by default.
pub const DEFAULT_KB_RESULTS: usize = 8;

/// Results requested when live search is the primary source.
pub const DEFAULT_SEARCH_RESULTS: usize = 4;

/// Assembles the evidence context for a query.
pub struct EvidenceRetriever {
    knowledge: Arc<dyn KnowledgeIndex>,
    search: Option<Arc<dyn WebSearch>>,
    kb_results: usize,
    search_results: usize,
}

impl EvidenceRetriever {
    /// `search` is `None` when no search key is configured.
    pub fn new(knowledge: Arc<dyn KnowledgeIndex>, search: Option<Arc<dyn WebSearch>>) -> Self {
        Self {
            knowledge,
            search,
            kb_results: DEFAULT_KB_RESULTS,
            search_results: DEFAULT_SEARCH_RESULTS,
        }
    }

    pub fn with_limits(mut self, kb_results: usize, search_results: usize) -> Self {
        self.kb_results = kb_results;
        self.search_results = search_results;
        self
    }

    /// Build the evidence context for `query`. Never fails.
    pub async fn gather(&self, query: &str) -> EvidenceContext {
        let snippets = self.lookup_knowledge(query).await;

        if snippets.is_empty() {
            info!("Knowledge base found no relevant information, using live search");
            return self.primary_search(query).await;
        }

        info!(sources = snippets.len(), "Using knowledge base as primary source");
        let mut text = format_knowledge_context(&snippets);
        let supplemented = match self.supplement(query).await {
            Some(section) => {
                text.push_str(&section);
                true
            }
            None => false,
        };

        EvidenceContext {
            text,
            origin: EvidenceOrigin::KnowledgeBase {
                sources: snippets.len(),
                supplemented,
            },
        }
    }

    async fn lookup_knowledge(&self, query: &str) -> Vec<EvidenceSnippet> {
        info!(query = %query, "Querying knowledge base");
        match self.knowledge.retrieve(query, self.kb_results).await {
            Ok(candidates) => {
                let total = candidates.len();
                let snippets = select_passages(candidates);
                info!(candidates = total, qualified = snippets.len(), "Knowledge base lookup complete");
                snippets
            }
            Err(e) => {
                error!(error = %e, "Knowledge base query failed");
                Vec::new()
            }
        }
    }

    async fn supplement(&self, query: &str) -> Option<String> {
        let search = self.search.as_ref()?;
        info!("Adding supplementary live search context");
        match search.search(query, SUPPLEMENT_ITEMS).await {
            Ok(results) => format_supplement(&results),
            Err(e) => {
                warn!(error = %e, "Supplementary live search failed");
                None
            }
        }
    }

    async fn primary_search(&self, query: &str) -> EvidenceContext {
        let Some(search) = &self.search else {
            warn!("No search API key configured, live search unavailable");
            return unavailable(query);
        };

        match search.search(query, self.search_results).await {
            Ok(results) => match format_live_search(&results) {
                Some(text) => {
                    info!(results = results.results.len(), "Live search successful");
                    EvidenceContext {
                        text,
                        origin: EvidenceOrigin::LiveSearch,
                    }
                }
                None => {
                    warn!("Live search returned no usable items");
                    unavailable(query)
                }
            },
            Err(e) => {
                error!(error = %e, "Live search failed");
                unavailable(query)
            }
        }
    }
}

fn unavailable(query: &str) -> EvidenceContext {
    EvidenceContext {
        text: fallback_search_context(query),
        origin: EvidenceOrigin::Unavailable,
    }
}
