//! Per-request augmentation pipeline
//!
//! Rewrite, retrieve, extract and inject run strictly in sequence. No
//! stage can fail the request: a stage that cannot produce anything
//! degrades to an empty content block, which leaves the request as it was.

use crate::config::{RagConfig, RetrievalConfig};
use crate::error::Result;
use crate::inject::{inject, InjectionFormat, InjectionMethod};
use crate::llm::ProviderRegistry;
use crate::request::OutgoingRequest;
use crate::retrieval::{RetrievalClient, RetrievalResult, Retriever};
use crate::rewrite::{QueryRewriter, RewrittenQuery};
use async_trait::async_trait;
use std::sync::Arc;

/// Extension point a host invokes once per outgoing LLM request
#[async_trait]
pub trait RequestHook: Send + Sync {
    async fn on_llm_request(&self, request: &mut OutgoingRequest, registry: &ProviderRegistry);
}

/// Retrieval-augmentation pipeline
pub struct RequestPipeline {
    retrieval_config: RetrievalConfig,
    format: InjectionFormat,
    rewriter: QueryRewriter,
    retriever: Arc<dyn Retriever>,
}

impl RequestPipeline {
    /// Build a pipeline backed by the RAGFlow HTTP client
    pub fn new(config: Arc<RagConfig>) -> Result<Self> {
        let retrieval_config = config.retrieval_config();
        let retriever = RetrievalClient::from_config(&retrieval_config)?;
        Ok(Self::with_retriever(config, Arc::new(retriever)))
    }

    /// Build a pipeline around any retriever
    pub fn with_retriever(config: Arc<RagConfig>, retriever: Arc<dyn Retriever>) -> Self {
        config.log_summary();
        Self {
            retrieval_config: config.retrieval_config(),
            format: config.injection_format(),
            rewriter: QueryRewriter::from_config(&config),
            retriever,
        }
    }

    pub fn injection_method(&self) -> InjectionMethod {
        self.retrieval_config.injection_method
    }

    /// Rewrite the request's query and retrieve content for it.
    ///
    /// Decomposed queries are retrieved one after another and their
    /// contents concatenated in order.
    pub async fn retrieve_for(
        &self,
        request: &OutgoingRequest,
        registry: &ProviderRegistry,
    ) -> (RewrittenQuery, RetrievalResult) {
        let rewritten = self.rewriter.rewrite(request, registry).await;

        let mut result = RetrievalResult::default();
        for query in rewritten.queries() {
            let partial = self.retriever.retrieve(query, &self.retrieval_config).await;
            result.extend(partial);
        }

        (rewritten, result)
    }

    /// Content block that would be injected for a result
    pub fn content_block(&self, result: &RetrievalResult) -> String {
        self.format.content_block(&result.contents)
    }

    /// Augment `request` in place.
    pub async fn on_llm_request(&self, request: &mut OutgoingRequest, registry: &ProviderRegistry) {
        if request.original_query.trim().is_empty() {
            tracing::debug!("Empty query, skipping retrieval");
            return;
        }

        let (_, result) = self.retrieve_for(request, registry).await;
        let block = self.content_block(&result);
        if block.is_empty() {
            tracing::debug!("No retrieved content, request passes through unchanged");
            return;
        }

        inject(request, &block, self.injection_method(), &self.format);
        tracing::info!(
            "Injected {} chunks ({} chars) via {}",
            result.len(),
            block.len(),
            self.injection_method()
        );
    }
}

#[async_trait]
impl RequestHook for RequestPipeline {
    async fn on_llm_request(&self, request: &mut OutgoingRequest, registry: &ProviderRegistry) {
        RequestPipeline::on_llm_request(self, request, registry).await
    }
}
