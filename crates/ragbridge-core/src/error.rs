//! Error types for ragbridge

use thiserror::Error;

/// Result type alias using RagError
pub type Result<T> = std::result::Result<T, RagError>;

/// Error type alias for convenience
pub type Error = RagError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for ragbridge
///
/// Only `Config` (and the I/O and YAML errors raised while loading a
/// config file) is meant to reach a caller. The rewrite and retrieval
/// variants are recovered inside the pipeline and only logged.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("Rewrite provider error: {0}")]
    RewriteProvider(String),

    #[error("Retrieval transport error: {0}")]
    RetrievalTransport(#[source] reqwest::Error),

    #[error("Retrieval service error: {0}")]
    RetrievalService(String),

    #[error("Malformed retrieval response: {0}")]
    MalformedResponse(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

impl RagError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Yaml(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
