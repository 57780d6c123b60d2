// crates/mediator-server/src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use crate::llm::Provider;
use tracing::{debug, info, warn};

/// API keys and hosts loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// OpenAI API key (OPENAI_API_KEY)
    pub openai: Option<String>,
    /// DeepSeek API key (DEEPSEEK_API_KEY)
    pub deepseek: Option<String>,
    /// Ollama host, e.g. http://localhost:11434 (OLLAMA_HOST)
    pub ollama_host: Option<String>,
}

impl ApiKeys {
    /// Load API keys from environment variables
    ///
    /// Set `MEDIATOR_DISABLE_LLM=1` to suppress all providers (forces static fallbacks)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load API keys through an arbitrary lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if parse_bool(lookup("MEDIATOR_DISABLE_LLM").as_deref()).unwrap_or(false) {
            info!("MEDIATOR_DISABLE_LLM is set, LLM providers disabled, using static fallbacks");
            return Self::default();
        }

        let read = |name: &str| lookup(name).filter(|k| !k.trim().is_empty());

        let keys = Self {
            openai: read("OPENAI_API_KEY"),
            deepseek: read("DEEPSEEK_API_KEY"),
            ollama_host: read("OLLAMA_HOST"),
        };
        keys.log_status();
        keys
    }

    /// Log which providers are available (without exposing values)
    fn log_status(&self) {
        let available = self.available();
        if available.is_empty() {
            warn!("No LLM providers configured - off-ramps will use static fallbacks");
        } else {
            debug!(providers = ?available, "API keys loaded");
        }
    }

    fn available(&self) -> Vec<&'static str> {
        let mut available = Vec::new();
        if self.openai.is_some() {
            available.push("OpenAI");
        }
        if self.deepseek.is_some() {
            available.push("DeepSeek");
        }
        if self.ollama_host.is_some() {
            available.push("Ollama");
        }
        available
    }

    /// Credential for a provider (the host for Ollama)
    pub fn for_provider(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai.as_deref(),
            Provider::DeepSeek => self.deepseek.as_deref(),
            Provider::Ollama => self.ollama_host.as_deref(),
        }
    }

    /// Check if any LLM provider is available
    pub fn has_llm_provider(&self) -> bool {
        self.openai.is_some() || self.deepseek.is_some() || self.ollama_host.is_some()
    }

    /// Get a summary of available providers
    pub fn summary(&self) -> String {
        let available = self.available();
        if available.is_empty() {
            "None".to_string()
        } else {
            available.join(", ")
        }
    }
}

/// Configuration validation result
#[derive(Debug)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for ConfigValidation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warn in &self.warnings {
                lines.push(format!("  - {}", warn));
            }
        }

        if lines.is_empty() {
            "Configuration OK".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Environment configuration - all env vars in one place
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// API keys for LLM providers
    pub api_keys: ApiKeys,
    /// Default LLM provider override (DEFAULT_LLM_PROVIDER)
    pub default_provider: Option<String>,
    /// Model override for the default provider (MEDIATOR_MODEL)
    pub model: Option<String>,
    /// Timeout for one generation call in seconds (MEDIATOR_GENERATION_TIMEOUT_SECS)
    pub generation_timeout_secs: Option<u64>,
    /// Log level for the CLI (MEDIATOR_LOG_LEVEL)
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load all environment configuration (call once at startup)
    pub fn load() -> Self {
        info!("Loading environment configuration");
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

        let generation_timeout_secs = non_empty("MEDIATOR_GENERATION_TIMEOUT_SECS")
            .and_then(|v| match v.trim().parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(_) => {
                    warn!(value = %v, "Invalid MEDIATOR_GENERATION_TIMEOUT_SECS, ignoring");
                    None
                }
            });

        Self {
            api_keys: ApiKeys::from_lookup(&lookup),
            default_provider: non_empty("DEFAULT_LLM_PROVIDER"),
            model: non_empty("MEDIATOR_MODEL"),
            generation_timeout_secs,
            log_level: non_empty("MEDIATOR_LOG_LEVEL"),
        }
    }

    /// Effective generation timeout: the env override unless it is zero
    pub fn effective_timeout_secs(&self, configured: u64) -> u64 {
        self.generation_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(configured)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if !self.api_keys.has_llm_provider() {
            validation.add_warning(
                "No LLM provider configured. Set OPENAI_API_KEY, DEEPSEEK_API_KEY or OLLAMA_HOST; \
                 EXPLAIN_PROCESS will use its static fallback.",
            );
        }

        if let Some(ref provider) = self.default_provider {
            match Provider::from_str(provider) {
                None => validation.add_warning(format!(
                    "Unknown DEFAULT_LLM_PROVIDER '{}'. Valid options: openai, deepseek, ollama",
                    provider
                )),
                Some(p) if self.api_keys.for_provider(p).is_none() => {
                    validation.add_warning(format!(
                        "DEFAULT_LLM_PROVIDER is '{}' but {} is not set",
                        p,
                        p.api_key_env_var()
                    ))
                }
                Some(_) => {}
            }
        }

        if self.generation_timeout_secs == Some(0) {
            validation.add_error("MEDIATOR_GENERATION_TIMEOUT_SECS must be greater than zero");
        }

        validation
    }
}

fn parse_bool(value: Option<&str>) -> Option<bool> {
    match value?.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
