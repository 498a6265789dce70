//! Live web search restricted to news and fact-checking outlets.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use claimcheck_core::SearchResults;

use super::{messages::error_message, secrets::ApiCredential, ProviderError};

/// Environment variable holding the Tavily API key.
pub const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";

const TAVILY_URL: &str = "https://api.tavily.com/search";

/// Default request timeout for live search.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(6);

/// Outlets live search is restricted to.
pub const SEARCH_DOMAINS: [&str; 9] = [
    "reuters.com",
    "bbc.com",
    "cnn.com",
    "apnews.com",
    "npr.org",
    "snopes.com",
    "factcheck.org",
    "politifact.com",
    "washingtonpost.com",
];

/// Domain-restricted live search.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
        -> Result<SearchResults, ProviderError>;
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'static str,
    include_images: bool,
    include_answer: bool,
    include_raw_content: bool,
    max_results: usize,
    include_domains: &'static [&'static str],
}

/// Tavily search client.
pub struct TavilySearch {
    credential: ApiCredential,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for TavilySearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilySearch")
            .field("credential", &self.credential)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TavilySearch {
    pub fn new(credential: ApiCredential) -> Self {
        Self {
            credential,
            timeout: DEFAULT_SEARCH_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// `None` when `TAVILY_API_KEY` is unset or blank; live search is then disabled.
    pub fn from_env() -> Option<Self> {
        ApiCredential::optional_from_env(TAVILY_API_KEY_ENV, "Tavily API key").map(Self::new)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn request<'a>(&'a self, query: &'a str, max_results: usize) -> TavilyRequest<'a> {
        TavilyRequest {
            api_key: self.credential.expose(),
            query,
            search_depth: "basic",
            include_images: false,
            include_answer: true,
            include_raw_content: false,
            max_results,
            include_domains: &SEARCH_DOMAINS,
        }
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<SearchResults, ProviderError> {
        let response = self
            .client
            .post(TAVILY_URL)
            .header("accept", "application/json")
            .timeout(self.timeout)
            .json(&self.request(query, max_results))
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, error_message(&body)));
        }

        response
            .json::<SearchResults>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimcheck_core::evidence::SearchItem;
    use crate::providers::CredentialSource;

    fn search() -> TavilySearch {
        TavilySearch::new(ApiCredential::new(
            "tvly-test-key",
            CredentialSource::Programmatic,
            "Tavily API key",
        ))
    }

    #[test]
    fn test_request_body() {
        let search = search();
        let json = serde_json::to_value(search.request("moon landing faked", 4)).unwrap();
        assert_eq!(json["query"], "moon landing faked");
        assert_eq!(json["search_depth"], "basic");
        assert_eq!(json["include_answer"], true);
        assert_eq!(json["include_images"], false);
        assert_eq!(json["max_results"], 4);
        assert_eq!(json["include_domains"].as_array().unwrap().len(), 9);
        assert_eq!(json["include_domains"][5], "snopes.com");
    }

    #[test]
    fn test_response_decodes() {
        let results: SearchResults = serde_json::from_value(serde_json::json!({
            "query": "moon landing",
            "answer": "The landings are well documented.",
            "results": [
                { "title": "Apollo 11", "url": "https://apnews.com/a", "content": "Armstrong stepped out", "score": 0.9 }
            ],
            "response_time": 1.2
        }))
        .unwrap();
        assert_eq!(results.answer.as_deref(), Some("The landings are well documented."));
        assert_eq!(
            results.results[0],
            SearchItem {
                title: "Apollo 11".to_string(),
                content: "Armstrong stepped out".to_string(),
                url: "https://apnews.com/a".to_string(),
            }
        );
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(search().timeout, Duration::from_secs(6));
    }

    #[test]
    fn test_key_not_in_debug_output() {
        let debug = format!("{:?}", search());
        assert!(!debug.contains("tvly-test-key"));
    }
}
