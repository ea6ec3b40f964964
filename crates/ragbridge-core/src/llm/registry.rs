//! Keyed registry of LLM providers

use super::{HttpLLMClient, LLMClient};
use crate::config::LLMServiceConfig;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for resolving providers by their configured key
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LLMClient>>,
}

impl ProviderRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build HTTP providers for every configured service
    pub fn from_config(services: &HashMap<String, LLMServiceConfig>) -> Result<Self> {
        let mut registry = Self::new();
        for (key, service) in services {
            let client = HttpLLMClient::new(service.clone())?;
            registry.register(key.clone(), Arc::new(client));
        }
        Ok(registry)
    }

    /// Register a provider under a key, replacing any previous one
    pub fn register(&mut self, key: impl Into<String>, provider: Arc<dyn LLMClient>) {
        self.providers.insert(key.into(), provider);
    }

    /// Get provider by key
    pub fn get(&self, key: &str) -> Option<Arc<dyn LLMClient>> {
        self.providers.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_from_config() {
        let mut services = HashMap::new();
        services.insert(
            "rewriter".to_string(),
            LLMServiceConfig {
                url: "http://localhost:8001".to_string(),
                model: "small-model".to_string(),
                ..LLMServiceConfig::default()
            },
        );

        let registry = ProviderRegistry::from_config(&services).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("rewriter").unwrap().model_name(), "small-model");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_registry_empty() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.keys().is_empty());
    }

    #[test]
    fn test_registry_keys_sorted() {
        let mut services = HashMap::new();
        for key in ["rewriter", "backup", "local"] {
            services.insert(key.to_string(), LLMServiceConfig::default());
        }
        let registry = ProviderRegistry::from_config(&services).unwrap();
        assert_eq!(registry.keys(), vec!["backup", "local", "rewriter"]);
    }
}
