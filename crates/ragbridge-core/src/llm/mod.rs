//! LLM integration
//!
//! Provides the provider trait used for query rewriting, an
//! OpenAI-compatible HTTP implementation, and the keyed registry the host
//! hands to the pipeline on every request.

mod client;
mod registry;

pub use client::{ChatMessage, HttpLLMClient, LLMClient};
pub use registry::ProviderRegistry;
