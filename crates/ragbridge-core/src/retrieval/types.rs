//! RAGFlow retrieval API wire types

use crate::config::{RetrievalConfig, RetrievalOptions};
use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/retrieval`
#[derive(Debug, Serialize)]
pub struct RetrievalRequest<'a> {
    pub question: &'a str,
    pub dataset_ids: &'a [String],
    pub top_k: u32,
    pub similarity_threshold: f64,
    #[serde(flatten)]
    pub options: &'a RetrievalOptions,
}

impl<'a> RetrievalRequest<'a> {
    pub fn new(question: &'a str, config: &'a RetrievalConfig) -> Self {
        Self {
            question,
            dataset_ids: &config.knowledge_base_ids,
            top_k: config.top_k,
            similarity_threshold: config.similarity_threshold,
            options: &config.options,
        }
    }
}

/// A retrieved chunk. Only `content` is ever injected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Chunk {
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub document_id: Option<String>,

    #[serde(default)]
    pub similarity: Option<f64>,
}

/// Envelope of every retrieval response
#[derive(Debug, Deserialize)]
struct RetrievalResponse {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<RetrievalData>,
}

#[derive(Debug, Deserialize)]
struct RetrievalData {
    #[serde(default)]
    chunks: Option<Vec<Chunk>>,
    #[serde(default)]
    total: Option<u64>,
}

/// Interpret a retrieval response body.
///
/// Any non-2xx status or non-zero `code` is a service error; a body that
/// does not carry `data.chunks` is malformed.
pub fn parse_retrieval_response(status: u16, body: &str) -> Result<Vec<Chunk>> {
    if !(200..300).contains(&status) {
        return Err(RagError::RetrievalService(format!(
            "HTTP {}: {}",
            status,
            body.trim()
        )));
    }

    let response: RetrievalResponse = serde_json::from_str(body)
        .map_err(|e| RagError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    if response.code != 0 {
        return Err(RagError::RetrievalService(format!(
            "code {}: {}",
            response.code,
            response.message.unwrap_or_default()
        )));
    }

    let data = response
        .data
        .ok_or_else(|| RagError::MalformedResponse("missing data".to_string()))?;

    let chunks = data
        .chunks
        .ok_or_else(|| RagError::MalformedResponse("missing data.chunks".to_string()))?;

    if let Some(total) = data.total {
        tracing::debug!("RAGFlow reported {} matches, {} returned", total, chunks.len());
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> RetrievalConfig {
        RetrievalConfig {
            base_url: "http://127.0.0.1:8000/".to_string(),
            api_key: "key".to_string(),
            knowledge_base_ids: vec!["kb1".to_string()],
            similarity_threshold: 0.35,
            top_k: 5,
            injection_method: Default::default(),
            timeout: Duration::from_secs(30),
            options: RetrievalOptions::default(),
        }
    }

    #[test]
    fn test_request_body_minimal() {
        let config = config();
        let body = serde_json::to_value(RetrievalRequest::new("sai's story", &config)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "question": "sai's story",
                "dataset_ids": ["kb1"],
                "top_k": 5,
                "similarity_threshold": 0.35
            })
        );
    }

    #[test]
    fn test_request_body_with_options() {
        let mut config = config();
        config.options.rerank_id = Some("bge-reranker-v2".to_string());
        config.options.highlight = Some(false);
        config.options.document_ids = vec!["doc9".to_string()];

        let body = serde_json::to_value(RetrievalRequest::new("q", &config)).unwrap();
        assert_eq!(body["rerank_id"], "bge-reranker-v2");
        assert_eq!(body["highlight"], false);
        assert_eq!(body["document_ids"], serde_json::json!(["doc9"]));
        assert!(body.get("page").is_none());
        assert!(body.get("metadata_condition").is_none());
    }

    #[test]
    fn test_parse_success() {
        let body = r#"{"code":0,"data":{"chunks":[
            {"content":"Paris is the capital of France.","similarity":0.87,"document_id":"d1"}
        ],"doc_aggs":[{"doc_id":"d1","count":1}],"total":1}}"#;
        let chunks = parse_retrieval_response(200, body).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Paris is the capital of France.");
        assert_eq!(chunks[0].similarity, Some(0.87));
    }

    #[test]
    fn test_parse_service_error_code() {
        let err =
            parse_retrieval_response(200, r#"{"code":102,"message":"datasets is required."}"#)
                .unwrap_err();
        assert!(matches!(err, RagError::RetrievalService(_)));
        assert!(err.to_string().contains("datasets is required."));
    }

    #[test]
    fn test_parse_http_error() {
        let err = parse_retrieval_response(502, "Bad Gateway").unwrap_err();
        assert!(matches!(err, RagError::RetrievalService(_)));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_retrieval_response(200, "<html>oops</html>").unwrap_err(),
            RagError::MalformedResponse(_)
        ));
        assert!(matches!(
            parse_retrieval_response(200, r#"{"code":0}"#).unwrap_err(),
            RagError::MalformedResponse(_)
        ));
        assert!(matches!(
            parse_retrieval_response(200, r#"{"code":0,"data":{"total":0}}"#).unwrap_err(),
            RagError::MalformedResponse(_)
        ));
    }

    #[test]
    fn test_parse_empty_chunks() {
        let chunks =
            parse_retrieval_response(200, r#"{"code":0,"data":{"chunks":[],"total":0}}"#).unwrap();
        assert!(chunks.is_empty());
    }
}
