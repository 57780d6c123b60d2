// crates/mediator-server/src/llm/factory.rs
// Provider factory for managing multiple LLM clients

use crate::config::{ApiKeys, EnvConfig, MediatorConfig};
use crate::llm::client::OpenAiCompatClient;
use crate::llm::provider::{LlmClient, Provider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Order in which providers are tried when no default is configured
const FALLBACK_ORDER: [Provider; 3] = [Provider::DeepSeek, Provider::OpenAi, Provider::Ollama];

/// Factory for creating and managing LLM provider clients
pub struct ProviderFactory {
    clients: HashMap<Provider, Arc<dyn LlmClient>>,
    default_provider: Option<Provider>,
}

impl ProviderFactory {
    /// Create a factory from pre-loaded configuration
    pub fn from_config(env: &EnvConfig, file: &MediatorConfig) -> Self {
        // Config file first, then env var
        let default_provider = file.default_provider().or_else(|| {
            env.default_provider
                .as_deref()
                .and_then(Provider::from_str)
        });
        // Env var model wins over the config file
        let model_override = env.model.clone().or_else(|| file.llm.model.clone());

        if let Some(ref p) = default_provider {
            info!(provider = %p, "Default LLM provider configured");
        }

        Self::from_api_keys(&env.api_keys, default_provider, model_override)
    }

    /// Create a factory from API keys. `model_override` applies to the default provider only.
    pub fn from_api_keys(
        api_keys: &ApiKeys,
        default_provider: Option<Provider>,
        model_override: Option<String>,
    ) -> Self {
        let mut clients: HashMap<Provider, Arc<dyn LlmClient>> = HashMap::new();

        for provider in FALLBACK_ORDER {
            let Some(credential) = api_keys.for_provider(provider) else {
                continue;
            };
            let model = match (&model_override, default_provider) {
                (Some(model), Some(default)) if default == provider => model.clone(),
                _ => provider.default_model().to_string(),
            };
            info!(provider = %provider, model = %model, "LLM client initialized");
            clients.insert(
                provider,
                Arc::new(OpenAiCompatClient::with_model(
                    provider,
                    credential.to_string(),
                    model,
                )),
            );
        }

        let available: Vec<_> = clients.keys().map(|p| p.to_string()).collect();
        info!(providers = ?available, "LLM providers available");

        Self {
            clients,
            default_provider,
        }
    }

    /// Get the client used for off-ramp generation.
    /// Priority: default provider -> fallback chain
    pub fn default_client(&self) -> Option<Arc<dyn LlmClient>> {
        if let Some(ref provider) = self.default_provider {
            if let Some(client) = self.clients.get(provider) {
                return Some(client.clone());
            }
            warn!(provider = %provider, "Configured default provider not available");
        }

        FALLBACK_ORDER
            .iter()
            .find_map(|provider| self.clients.get(provider).cloned())
    }

    /// List available providers in fallback order
    pub fn available_providers(&self) -> Vec<Provider> {
        FALLBACK_ORDER
            .iter()
            .copied()
            .filter(|p| self.clients.contains_key(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(openai: bool, deepseek: bool, ollama: bool) -> ApiKeys {
        ApiKeys {
            openai: openai.then(|| "sk-openai".to_string()),
            deepseek: deepseek.then(|| "sk-deepseek".to_string()),
            ollama_host: ollama.then(|| "http://localhost:11434".to_string()),
        }
    }

    #[test]
    fn test_empty_factory_has_no_providers() {
        let factory = ProviderFactory::from_api_keys(&ApiKeys::default(), None, None);
        assert!(factory.default_client().is_none());
        assert!(factory.available_providers().is_empty());
    }

    #[test]
    fn test_fallback_order() {
        let factory = ProviderFactory::from_api_keys(&keys(true, true, false), None, None);
        assert_eq!(
            factory.available_providers(),
            vec![Provider::DeepSeek, Provider::OpenAi]
        );
        let client = factory.default_client().unwrap();
        assert_eq!(client.provider_type(), Provider::DeepSeek);
    }

    #[test]
    fn test_default_provider_preferred() {
        let factory =
            ProviderFactory::from_api_keys(&keys(true, true, false), Some(Provider::OpenAi), None);
        let client = factory.default_client().unwrap();
        assert_eq!(client.provider_type(), Provider::OpenAi);
    }

    #[test]
    fn test_unavailable_default_falls_back() {
        let factory =
            ProviderFactory::from_api_keys(&keys(false, false, true), Some(Provider::OpenAi), None);
        assert_eq!(factory.available_providers(), vec![Provider::Ollama]);
        let client = factory.default_client().unwrap();
        assert_eq!(client.provider_type(), Provider::Ollama);
    }

    #[test]
    fn test_model_override_applies_to_default_only() {
        let factory = ProviderFactory::from_api_keys(
            &keys(true, true, false),
            Some(Provider::OpenAi),
            Some("gpt-4.1-mini".to_string()),
        );
        assert_eq!(factory.default_client().unwrap().model_name(), "gpt-4.1-mini");

        // Default not configured with a key: the fallback keeps its own model
        let factory = ProviderFactory::from_api_keys(
            &keys(false, true, false),
            Some(Provider::OpenAi),
            Some("gpt-4.1-mini".to_string()),
        );
        assert_eq!(factory.default_client().unwrap().model_name(), "deepseek-chat");
    }

    #[test]
    fn test_from_config_reads_file_provider() {
        let env = EnvConfig {
            api_keys: keys(true, true, false),
            default_provider: Some("deepseek".to_string()),
            ..Default::default()
        };
        let file: MediatorConfig = toml::from_str("[llm]\ndefault_provider = \"openai\"\n").unwrap();
        let factory = ProviderFactory::from_config(&env, &file);
        let client = factory.default_client().unwrap();
        assert_eq!(client.provider_type(), Provider::OpenAi);
    }
}
