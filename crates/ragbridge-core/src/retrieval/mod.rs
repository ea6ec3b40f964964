//! Retrieval against the RAGFlow HTTP API
//!
//! Retrieval is an enhancement: every failure mode collapses into an
//! empty [`RetrievalResult`] after being logged, so the enclosing LLM
//! request always proceeds.

mod types;

pub use types::{parse_retrieval_response, Chunk, RetrievalRequest};

use crate::config::RetrievalConfig;
use crate::error::{RagError, Result};
use crate::extract::extract;
use async_trait::async_trait;
use std::time::Duration;

/// Chunk contents in service relevance order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievalResult {
    pub contents: Vec<String>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Append another result, keeping both orders
    pub fn extend(&mut self, other: RetrievalResult) {
        self.contents.extend(other.contents);
    }
}

impl From<Vec<String>> for RetrievalResult {
    fn from(contents: Vec<String>) -> Self {
        Self { contents }
    }
}

/// Source of retrieved chunks
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Fetch raw chunks for a query, surfacing every failure
    async fn fetch_chunks(&self, query: &str, config: &RetrievalConfig) -> Result<Vec<Chunk>>;

    /// Fetch and extract, degrading to an empty result on failure
    async fn retrieve(&self, query: &str, config: &RetrievalConfig) -> RetrievalResult {
        match self.fetch_chunks(query, config).await {
            Ok(chunks) => {
                if chunks.is_empty() {
                    tracing::info!("RAGFlow returned no relevant content");
                } else {
                    tracing::info!("Retrieved {} chunks from RAGFlow", chunks.len());
                }
                RetrievalResult::from(extract(&chunks))
            }
            Err(e) => {
                match &e {
                    RagError::MalformedResponse(_) => {
                        tracing::warn!("Ignoring RAGFlow response: {}", e)
                    }
                    _ => tracing::error!("RAGFlow retrieval failed: {}", e),
                }
                RetrievalResult::default()
            }
        }
    }
}

/// HTTP client for `POST /api/v1/retrieval`
#[derive(Clone)]
pub struct RetrievalClient {
    http_client: reqwest::Client,
}

impl RetrievalClient {
    /// Create a client whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RagError::Http)?;
        Ok(Self { http_client })
    }

    /// Create from the timeout carried by a config snapshot
    pub fn from_config(config: &RetrievalConfig) -> Result<Self> {
        Self::new(config.timeout)
    }
}

#[async_trait]
impl Retriever for RetrievalClient {
    async fn fetch_chunks(&self, query: &str, config: &RetrievalConfig) -> Result<Vec<Chunk>> {
        if !config.is_complete() {
            tracing::warn!("RAGFlow is not fully configured, skipping retrieval");
            return Ok(Vec::new());
        }

        let url = config.endpoint();
        tracing::debug!(
            "Querying RAGFlow at {} ({} datasets): {}",
            url,
            config.knowledge_base_ids.len(),
            query
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&config.api_key)
            .timeout(config.timeout)
            .json(&RetrievalRequest::new(query, config))
            .send()
            .await
            .map_err(RagError::RetrievalTransport)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(RagError::RetrievalTransport)?;

        parse_retrieval_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RagConfig;

    struct FailingRetriever;

    #[async_trait]
    impl Retriever for FailingRetriever {
        async fn fetch_chunks(&self, _: &str, _: &RetrievalConfig) -> Result<Vec<Chunk>> {
            Err(RagError::RetrievalService("code 102: datasets is required.".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failure_degrades_to_empty() {
        let config = RagConfig::default().retrieval_config();
        let result = FailingRetriever.retrieve("anything", &config).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_config_skips_network() {
        // Port 9 is discard; an actual request would fail, not return Ok.
        let mut config = RagConfig::default().retrieval_config();
        config.base_url = "http://127.0.0.1:9/".to_string();
        config.api_key = String::new();

        let client = RetrievalClient::from_config(&config).unwrap();
        let chunks = client.fetch_chunks("q", &config).await.unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_result_extend_keeps_order() {
        let mut result = RetrievalResult::from(vec!["a".to_string()]);
        result.extend(RetrievalResult::from(vec!["b".to_string(), "c".to_string()]));
        assert_eq!(result.contents, vec!["a", "b", "c"]);
        assert_eq!(result.len(), 3);
    }
}
