//! Configuration management

mod mask;

pub use mask::{mask_sensitive_info, DEFAULT_KEEP_LAST};

use crate::error::{RagError, Result};
use crate::inject::{InjectionFormat, InjectionMethod};
use crate::rewrite::RewriteStrategy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
///
/// Top-level keys mirror the plugin settings exposed to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Base URL of the RAGFlow service
    #[serde(default = "default_base_url")]
    pub ragflow_base_url: String,

    /// RAGFlow API key, sent as a bearer token
    #[serde(default)]
    pub ragflow_api_key: String,

    /// Dataset (knowledge base) IDs to search
    #[serde(default)]
    pub ragflow_kb_ids: Vec<String>,

    #[serde(default)]
    pub enable_query_rewrite: bool,

    /// Registry key of the provider used for rewriting
    #[serde(default)]
    pub query_rewrite_provider_key: String,

    #[serde(default)]
    pub query_rewrite_strategy: RewriteStrategy,

    /// Upper bound on the rewrite call, in seconds
    #[serde(default = "default_rewrite_timeout")]
    pub query_rewrite_timeout_secs: u64,

    /// Most sub-questions a decomposition may retrieve for
    #[serde(default = "default_max_sub_questions")]
    pub query_rewrite_max_sub_questions: usize,

    #[serde(default)]
    pub rag_injection_method: InjectionMethod,

    /// Line placed before the retrieved content
    #[serde(default)]
    pub rag_context_header: Option<String>,

    /// Line placed after the retrieved content
    #[serde(default)]
    pub rag_context_footer: Option<String>,

    /// Separator between chunk contents
    #[serde(default = "default_separator")]
    pub rag_chunk_separator: String,

    /// Separator between the injected block and existing prompt text
    #[serde(default = "default_separator")]
    pub rag_prompt_separator: String,

    #[serde(default)]
    pub retrieval: RetrievalSettings,

    /// OpenAI-compatible services registered as rewrite providers
    #[serde(default)]
    pub providers: HashMap<String, LLMServiceConfig>,
}

/// Retrieval request tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(flatten)]
    pub options: RetrievalOptions,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            similarity_threshold: default_similarity_threshold(),
            timeout_secs: default_timeout(),
            options: RetrievalOptions::default(),
        }
    }
}

/// Optional retrieval API fields, sent only when set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub document_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_similarity_weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cross_languages: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_condition: Option<serde_json::Value>,
}

/// Immutable snapshot handed to the retrieval client
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    pub base_url: String,
    pub api_key: String,
    pub knowledge_base_ids: Vec<String>,
    pub similarity_threshold: f64,
    pub top_k: u32,
    pub injection_method: InjectionMethod,
    pub timeout: Duration,
    pub options: RetrievalOptions,
}

impl RetrievalConfig {
    /// Whether URL, key and datasets are all present
    pub fn is_complete(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty() && !self.knowledge_base_ids.is_empty()
    }

    /// Full URL of the retrieval endpoint
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            crate::RETRIEVAL_ENDPOINT
        )
    }
}

/// LLM service configuration for rewrite providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the OpenAI-compatible service
    pub url: String,

    #[serde(default = "default_chat_model")]
    pub model: String,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("RAGBRIDGE_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_chat_model(),
            api_key: std::env::var("RAGBRIDGE_LLM_API_KEY").ok(),
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/".to_string()
}

fn default_separator() -> String {
    "\n\n".to_string()
}

fn default_top_k() -> u32 {
    5
}

fn default_similarity_threshold() -> f64 {
    0.35
}

fn default_timeout() -> u64 {
    30
}

fn default_rewrite_timeout() -> u64 {
    15
}

fn default_max_sub_questions() -> usize {
    5
}

fn default_chat_model() -> String {
    std::env::var("RAGBRIDGE_LLM_MODEL")
        .unwrap_or_else(|_| "meta-llama/Llama-3.1-8B-Instruct".to_string())
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    512
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            ragflow_base_url: default_base_url(),
            ragflow_api_key: String::new(),
            ragflow_kb_ids: Vec::new(),
            enable_query_rewrite: false,
            query_rewrite_provider_key: String::new(),
            query_rewrite_strategy: RewriteStrategy::default(),
            query_rewrite_timeout_secs: default_rewrite_timeout(),
            query_rewrite_max_sub_questions: default_max_sub_questions(),
            rag_injection_method: InjectionMethod::default(),
            rag_context_header: None,
            rag_context_footer: None,
            rag_chunk_separator: default_separator(),
            rag_prompt_separator: default_separator(),
            retrieval: RetrievalSettings::default(),
            providers: HashMap::new(),
        }
    }
}

impl RagConfig {
    /// Load config from `RAGBRIDGE_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        let path = std::env::var("RAGBRIDGE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        Self::load_from(&path)
    }

    /// Load config from a file, falling back to defaults when it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse_yaml(&content)
                .map_err(|e| RagError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document, without environment overrides
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config = Self::parse_yaml(content)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Save config to a path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Apply `RAGBRIDGE_BASE_URL`, `RAGBRIDGE_API_KEY` and `RAGBRIDGE_KB_IDS`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("RAGBRIDGE_BASE_URL") {
            self.ragflow_base_url = url;
        }
        if let Ok(key) = std::env::var("RAGBRIDGE_API_KEY") {
            self.ragflow_api_key = key;
        }
        if let Ok(ids) = std::env::var("RAGBRIDGE_KB_IDS") {
            self.ragflow_kb_ids = ids
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    /// Reject values that cannot produce a working pipeline
    pub fn validate(&self) -> Result<()> {
        if !self.ragflow_base_url.is_empty() {
            reqwest::Url::parse(&self.ragflow_base_url).map_err(|e| {
                RagError::Config(format!(
                    "invalid ragflow_base_url '{}': {}",
                    self.ragflow_base_url, e
                ))
            })?;
        }

        let threshold = self.retrieval.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RagError::Config(format!(
                "similarity_threshold must be within 0..=1, got {}",
                threshold
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(RagError::Config("top_k must be at least 1".to_string()));
        }

        if self.retrieval.timeout_secs == 0 || self.query_rewrite_timeout_secs == 0 {
            return Err(RagError::Config("timeouts must be at least 1 second".to_string()));
        }

        if self.query_rewrite_max_sub_questions == 0 {
            return Err(RagError::Config(
                "query_rewrite_max_sub_questions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Snapshot for the retrieval client
    pub fn retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig {
            base_url: self.ragflow_base_url.clone(),
            api_key: self.ragflow_api_key.clone(),
            knowledge_base_ids: self.ragflow_kb_ids.clone(),
            similarity_threshold: self.retrieval.similarity_threshold,
            top_k: self.retrieval.top_k,
            injection_method: self.rag_injection_method,
            timeout: Duration::from_secs(self.retrieval.timeout_secs),
            options: self.retrieval.options.clone(),
        }
    }

    /// Formatting used to build and place the content block
    pub fn injection_format(&self) -> InjectionFormat {
        InjectionFormat {
            chunk_separator: self.rag_chunk_separator.clone(),
            prompt_separator: self.rag_prompt_separator.clone(),
            header: self.rag_context_header.clone(),
            footer: self.rag_context_footer.clone(),
        }
    }

    /// Copy with API keys and dataset IDs masked
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        masked.ragflow_api_key = mask_sensitive_info(&self.ragflow_api_key, DEFAULT_KEEP_LAST);
        masked.ragflow_kb_ids = self
            .ragflow_kb_ids
            .iter()
            .map(|id| mask_sensitive_info(id, DEFAULT_KEEP_LAST))
            .collect();
        for service in masked.providers.values_mut() {
            if let Some(ref key) = service.api_key {
                service.api_key = Some(mask_sensitive_info(key, DEFAULT_KEEP_LAST));
            }
        }
        masked
    }

    /// Log the effective settings with secrets masked
    pub fn log_summary(&self) {
        let masked = self.masked();
        tracing::info!("RAGFlow adapter initialized");
        tracing::info!("  RAGFlow base URL: {}", masked.ragflow_base_url);
        tracing::info!("  RAGFlow API key: {}", masked.ragflow_api_key);
        tracing::info!("  RAGFlow datasets: {:?}", masked.ragflow_kb_ids);
        tracing::info!("  Injection method: {}", masked.rag_injection_method);
        tracing::info!(
            "  Query rewrite: {}",
            if masked.enable_query_rewrite { "enabled" } else { "disabled" }
        );
        if masked.enable_query_rewrite {
            let provider = if masked.query_rewrite_provider_key.is_empty() {
                "<unset>"
            } else {
                masked.query_rewrite_provider_key.as_str()
            };
            tracing::info!(
                "  Rewrite provider: {} ({})",
                provider,
                masked.query_rewrite_strategy
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.ragflow_base_url, "http://127.0.0.1:8000/");
        assert!(config.ragflow_api_key.is_empty());
        assert!(config.ragflow_kb_ids.is_empty());
        assert!(!config.enable_query_rewrite);
        assert!(config.query_rewrite_provider_key.is_empty());
        assert_eq!(config.rag_injection_method, InjectionMethod::SystemPrompt);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.similarity_threshold, 0.35);
        assert_eq!(config.query_rewrite_max_sub_questions, 5);
    }

    #[test]
    fn test_zero_sub_question_cap_rejected() {
        let err = RagConfig::from_yaml_str("query_rewrite_max_sub_questions: 0
").unwrap_err();
        assert!(err.to_string().contains("query_rewrite_max_sub_questions"));
    }

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = RagConfig::from_yaml_str("").unwrap();
        assert_eq!(config, RagConfig::default());
    }

    #[test]
    fn test_parse_plugin_keys() {
        let yaml = r#"
ragflow_base_url: "http://ragflow.local:9380/"
ragflow_api_key: "ragflow-secret-key"
ragflow_kb_ids: ["kb-one", "kb-two"]
enable_query_rewrite: true
query_rewrite_provider_key: "rewriter"
rag_injection_method: insert_system_prompt
retrieval:
  top_k: 8
  rerank_id: "bge-reranker"
"#;
        let config = RagConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.ragflow_kb_ids, vec!["kb-one", "kb-two"]);
        assert!(config.enable_query_rewrite);
        assert_eq!(
            config.rag_injection_method,
            InjectionMethod::InsertSystemMessage
        );
        assert_eq!(config.retrieval.top_k, 8);
        assert_eq!(config.retrieval.similarity_threshold, 0.35);
        assert_eq!(
            config.retrieval.options.rerank_id.as_deref(),
            Some("bge-reranker")
        );

        let snapshot = config.retrieval_config();
        assert!(snapshot.is_complete());
        assert_eq!(
            snapshot.endpoint(),
            "http://ragflow.local:9380/api/v1/retrieval"
        );
    }

    #[test]
    fn test_unknown_injection_method_is_fatal() {
        let result = RagConfig::from_yaml_str("rag_injection_method: append_everywhere\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let yaml = "retrieval:\n  similarity_threshold: 1.5\n";
        let err = RagConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = RagConfig::from_yaml_str("ragflow_base_url: \"not a url\"\n").unwrap_err();
        assert!(err.to_string().contains("ragflow_base_url"));
    }

    #[test]
    fn test_incomplete_retrieval_config() {
        let config = RagConfig::default();
        assert!(!config.retrieval_config().is_complete());
    }

    #[test]
    fn test_masked_hides_secrets() {
        let mut config = RagConfig::default();
        config.ragflow_api_key = "ragflow-abcdefghijkl".to_string();
        config.ragflow_kb_ids = vec!["1f9f9e4aad7c11f0aa2efaceb254e4de".to_string()];

        let masked = config.masked();
        assert_eq!(masked.ragflow_api_key, "******ghijkl");
        assert_eq!(masked.ragflow_kb_ids, vec!["******54e4de"]);
        assert_eq!(config.ragflow_api_key, "ragflow-abcdefghijkl");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yml");

        let mut config = RagConfig::default();
        config.rag_injection_method = InjectionMethod::UserPromptPrefix;
        config.rag_context_header = Some("--- reference material ---".to_string());
        config.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("rag_injection_method: user_prompt"));

        let loaded = RagConfig::from_yaml_str(&content).unwrap();
        assert_eq!(loaded.rag_injection_method, InjectionMethod::UserPromptPrefix);
        assert_eq!(
            loaded.rag_context_header.as_deref(),
            Some("--- reference material ---")
        );
    }
}
