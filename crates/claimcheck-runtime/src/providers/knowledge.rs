//! Curated knowledge index.
//!
//! [`BedrockKnowledgeIndex`] posts the Bedrock agent-runtime `Retrieve`
//! body and maps each retrieval result to a [`KnowledgePassage`]. Filtering
//! and ranking happen in `claimcheck_core::evidence`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use claimcheck_core::evidence::{KnowledgePassage, INTERNAL_SOURCE};

use super::{messages::error_message, secrets::ApiCredential, ProviderError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Hybrid (semantic + keyword) retrieval.
#[async_trait]
pub trait KnowledgeIndex: Send + Sync {
    /// Up to `max_results` raw candidates for `query`, unfiltered.
    async fn retrieve(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<KnowledgePassage>, ProviderError>;
}

/// Regional Bedrock agent-runtime endpoint.
pub fn agent_runtime_endpoint(region: &str) -> String {
    format!("https://bedrock-agent-runtime.{}.amazonaws.com", region)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveRequest<'a> {
    retrieval_query: RetrievalQuery<'a>,
    retrieval_configuration: RetrievalConfiguration,
}

#[derive(Debug, Serialize)]
struct RetrievalQuery<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfiguration {
    vector_search_configuration: VectorSearchConfiguration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorSearchConfiguration {
    number_of_results: usize,
    override_search_type: &'static str,
}

impl<'a> RetrieveRequest<'a> {
    fn hybrid(query: &'a str, max_results: usize) -> Self {
        Self {
            retrieval_query: RetrievalQuery { text: query },
            retrieval_configuration: RetrievalConfiguration {
                vector_search_configuration: VectorSearchConfiguration {
                    number_of_results: max_results,
                    override_search_type: "HYBRID",
                },
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveResponse {
    #[serde(default)]
    retrieval_results: Vec<RetrievalResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RetrievalResult {
    content: ResultContent,
    score: f64,
    location: ResultLocation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResultContent {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ResultLocation {
    s3_location: Option<S3Location>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct S3Location {
    uri: Option<String>,
}

impl From<RetrievalResult> for KnowledgePassage {
    fn from(result: RetrievalResult) -> Self {
        let source = result
            .location
            .s3_location
            .and_then(|s3| s3.uri)
            .unwrap_or_else(|| INTERNAL_SOURCE.to_string());
        KnowledgePassage::new(result.content.text, result.score, source)
    }
}

/// Bedrock knowledge base client.
pub struct BedrockKnowledgeIndex {
    endpoint: String,
    knowledge_base_id: String,
    credential: Option<ApiCredential>,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for BedrockKnowledgeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockKnowledgeIndex")
            .field("endpoint", &self.endpoint)
            .field("knowledge_base_id", &self.knowledge_base_id)
            .field("credential", &self.credential)
            .finish()
    }
}

impl BedrockKnowledgeIndex {
    pub fn new(endpoint: impl Into<String>, knowledge_base_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            knowledge_base_id: knowledge_base_id.into(),
            credential: None,
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Bearer credential for the agent-runtime endpoint.
    pub fn with_credential(mut self, credential: Option<ApiCredential>) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn retrieve_url(&self) -> String {
        format!(
            "{}/knowledgebases/{}/retrieve",
            self.endpoint, self.knowledge_base_id
        )
    }
}

#[async_trait]
impl KnowledgeIndex for BedrockKnowledgeIndex {
    async fn retrieve(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<KnowledgePassage>, ProviderError> {
        let mut request = self
            .client
            .post(self.retrieve_url())
            .timeout(self.timeout)
            .json(&RetrieveRequest::hybrid(query, max_results));

        if let Some(credential) = &self.credential {
            request = request.bearer_auth(credential.expose());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, error_message(&body)));
        }

        let body: RetrieveResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(body
            .retrieval_results
            .into_iter()
            .map(KnowledgePassage::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hybrid_request_shape() {
        let json = serde_json::to_value(RetrieveRequest::hybrid("moon landing", 8)).unwrap();
        assert_eq!(json["retrievalQuery"]["text"], "moon landing");
        let vector = &json["retrievalConfiguration"]["vectorSearchConfiguration"];
        assert_eq!(vector["numberOfResults"], 8);
        assert_eq!(vector["overrideSearchType"], "HYBRID");
    }

    #[test]
    fn test_results_map_to_passages() {
        let response: RetrieveResponse = serde_json::from_value(serde_json::json!({
            "retrievalResults": [
                {
                    "content": { "text": "Apollo 11 landed on the Moon on July 20, 1969." },
                    "score": 0.91,
                    "location": {
                        "type": "S3",
                        "s3Location": { "uri": "s3://kb-bucket/space/apollo.txt" }
                    }
                },
                { "content": { "text": "No location here." }, "score": 0.5 }
            ]
        }))
        .unwrap();

        let passages: Vec<KnowledgePassage> = response
            .retrieval_results
            .into_iter()
            .map(KnowledgePassage::from)
            .collect();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].source, "s3://kb-bucket/space/apollo.txt");
        assert!((passages[0].score - 0.91).abs() < f64::EPSILON);
        assert_eq!(passages[1].source, "Internal KB");
    }

    #[test]
    fn test_empty_response() {
        let response: RetrieveResponse = serde_json::from_str("{}").unwrap();
        assert!(response.retrieval_results.is_empty());
    }

    #[test]
    fn test_retrieve_url() {
        let index = BedrockKnowledgeIndex::new(agent_runtime_endpoint("ap-southeast-2"), "OFLYCZAWWQ");
        assert_eq!(
            index.retrieve_url(),
            "https://bedrock-agent-runtime.ap-southeast-2.amazonaws.com/knowledgebases/OFLYCZAWWQ/retrieve"
        );
    }
}
