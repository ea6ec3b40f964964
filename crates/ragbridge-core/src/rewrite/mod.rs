//! Optional query rewriting before retrieval
//!
//! Rewriting is best effort: a missing provider, a failed or slow call,
//! or an empty answer all fall back to the original query.

mod strategies;

pub use strategies::{
    build_detection_prompt, build_rewrite_prompt, parse_query_type, parse_sub_questions, QueryType,
    RewriteStrategy,
};

use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::llm::{LLMClient, ProviderRegistry};
use crate::request::OutgoingRequest;
use std::time::Duration;

/// Default cap on the sub-questions a decomposition is retrieved for
pub const DEFAULT_MAX_SUB_QUESTIONS: usize = 5;

/// Outcome of a rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewrittenQuery {
    /// One query to retrieve with (possibly the original)
    Single(String),
    /// Independent sub-questions, retrieved one after another
    Decomposed(Vec<String>),
}

impl RewrittenQuery {
    /// Queries to run retrieval with, in order
    pub fn queries(&self) -> Vec<&str> {
        match self {
            Self::Single(q) => vec![q.as_str()],
            Self::Decomposed(qs) => qs.iter().map(String::as_str).collect(),
        }
    }

    /// Whether this is exactly `original`
    pub fn is_unchanged(&self, original: &str) -> bool {
        matches!(self, Self::Single(q) if q == original)
    }
}

/// Rewrites user queries through a provider resolved by key
#[derive(Debug, Clone)]
pub struct QueryRewriter {
    enabled: bool,
    provider_key: String,
    strategy: RewriteStrategy,
    timeout: Duration,
    max_sub_questions: usize,
}

impl QueryRewriter {
    pub fn new(
        enabled: bool,
        provider_key: impl Into<String>,
        strategy: RewriteStrategy,
        timeout: Duration,
    ) -> Self {
        Self {
            enabled,
            provider_key: provider_key.into(),
            strategy,
            timeout,
            max_sub_questions: DEFAULT_MAX_SUB_QUESTIONS,
        }
    }

    /// Keep at most `max` sub-questions from a decomposition
    pub fn with_max_sub_questions(mut self, max: usize) -> Self {
        self.max_sub_questions = max.max(1);
        self
    }

    /// A rewriter that always returns the original query
    pub fn disabled() -> Self {
        Self::new(false, "", RewriteStrategy::Simple, Duration::from_secs(1))
    }

    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(
            config.enable_query_rewrite,
            config.query_rewrite_provider_key.clone(),
            config.query_rewrite_strategy,
            Duration::from_secs(config.query_rewrite_timeout_secs),
        )
        .with_max_sub_questions(config.query_rewrite_max_sub_questions)
    }

    /// Rewrite the query of `request`, never failing.
    pub async fn rewrite(
        &self,
        request: &OutgoingRequest,
        registry: &ProviderRegistry,
    ) -> RewrittenQuery {
        let original = request.original_query.as_str();
        if !self.enabled {
            return RewrittenQuery::Single(original.to_string());
        }

        match self.try_rewrite(request, registry).await {
            Ok(rewritten) => {
                tracing::info!("Query rewritten: '{}' -> {:?}", original, rewritten.queries());
                rewritten
            }
            Err(e) => {
                match &e {
                    RagError::RewriteProvider(_) => {
                        tracing::warn!("{}. Using original query", e)
                    }
                    _ => tracing::error!("Query rewrite failed: {}. Using original query", e),
                }
                RewrittenQuery::Single(original.to_string())
            }
        }
    }

    async fn try_rewrite(
        &self,
        request: &OutgoingRequest,
        registry: &ProviderRegistry,
    ) -> Result<RewrittenQuery> {
        if self.provider_key.is_empty() {
            return Err(RagError::RewriteProvider(
                "query rewrite is enabled but no provider is selected".to_string(),
            ));
        }

        let provider = registry.get(&self.provider_key).ok_or_else(|| {
            RagError::RewriteProvider(format!(
                "rewrite provider '{}' not found (registered: [{}])",
                self.provider_key,
                registry.keys().join(", ")
            ))
        })?;

        let query = request.original_query.as_str();
        let history = request.history_transcript();

        let strategy = match self.strategy {
            RewriteStrategy::Auto => {
                let prompt = build_detection_prompt(query, &history);
                let detection = self.complete(provider.as_ref(), &prompt).await?;
                let query_type = parse_query_type(&detection);
                tracing::info!("Query '{}' detected as {}", query, query_type);
                match query_type.strategy() {
                    Some(strategy) => strategy,
                    None => return Ok(RewrittenQuery::Single(query.to_string())),
                }
            }
            strategy => strategy,
        };

        let history = if strategy.uses_history() {
            history.as_str()
        } else {
            ""
        };
        let prompt = build_rewrite_prompt(strategy, query, history);

        let completion = self.complete(provider.as_ref(), &prompt).await?;
        let completion = completion.trim();
        if completion.is_empty() {
            return Err(RagError::RewriteProvider(
                "rewrite provider returned an empty response".to_string(),
            ));
        }

        match strategy {
            RewriteStrategy::MultiIntent => {
                let mut questions = parse_sub_questions(completion);
                if questions.is_empty() {
                    return Err(RagError::RewriteProvider(
                        "decomposition produced no questions".to_string(),
                    ));
                }
                if questions.len() > self.max_sub_questions {
                    tracing::warn!(
                        "Decomposition produced {} questions, keeping the first {}",
                        questions.len(),
                        self.max_sub_questions
                    );
                    questions.truncate(self.max_sub_questions);
                }
                Ok(RewrittenQuery::Decomposed(questions))
            }
            _ => Ok(RewrittenQuery::Single(completion.to_string())),
        }
    }

    async fn complete(&self, provider: &dyn LLMClient, prompt: &str) -> Result<String> {
        tracing::debug!("Rewrite prompt for {}:\n{}", provider.model_name(), prompt);

        let completion = tokio::time::timeout(self.timeout, provider.text_chat(prompt))
            .await
            .map_err(|_| RagError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            })?
            .map_err(|e| RagError::RewriteProvider(e.to_string()))?;

        tracing::debug!("Rewrite provider returned: {}", completion);
        Ok(completion)
    }
}
