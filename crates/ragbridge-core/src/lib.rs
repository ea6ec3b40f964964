//! Ragbridge Core Library
//!
//! Retrieval augmentation for outgoing LLM requests.
//!
//! # Features
//! - Optional LLM-powered query rewriting before retrieval
//! - RAGFlow `/api/v1/retrieval` client with graceful degradation
//! - Chunk content extraction in service relevance order
//! - Context injection into the system prompt, user prompt, or history
//! - A single per-request hook that wires it all together

pub mod config;
pub mod error;
pub mod extract;
pub mod inject;
pub mod llm;
pub mod pipeline;
pub mod request;
pub mod retrieval;
pub mod rewrite;

pub use config::{mask_sensitive_info, LLMServiceConfig, RagConfig, RetrievalConfig};
pub use error::{Error, RagError, Result};
pub use extract::extract;
pub use inject::{inject, InjectionFormat, InjectionMethod};
pub use llm::{ChatMessage, HttpLLMClient, LLMClient, ProviderRegistry};
pub use pipeline::{RequestHook, RequestPipeline};
pub use request::OutgoingRequest;
pub use retrieval::{Chunk, RetrievalClient, RetrievalResult, Retriever};
pub use rewrite::{QueryRewriter, QueryType, RewriteStrategy, RewrittenQuery};

/// Retrieval endpoint path, relative to the service base URL
pub const RETRIEVAL_ENDPOINT: &str = "api/v1/retrieval";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "ragbridge";
