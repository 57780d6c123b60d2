// crates/mediator-server/src/config/file.rs
// File-based configuration from ~/.mediator/config.toml

use crate::llm::{BreakerPolicy, Provider};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_HISTORY_WINDOW: usize = 6;
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 300;
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Top-level config structure
#[derive(Debug, Deserialize, Default)]
pub struct MediatorConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub dispatch: DispatchSettings,
}

/// LLM configuration section
#[derive(Debug, Deserialize, Default)]
pub struct LlmConfig {
    /// Provider used for off-ramp generation
    pub default_provider: Option<String>,
    /// Model override for that provider
    pub model: Option<String>,
}

/// Off-ramp dispatch settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DispatchSettings {
    /// How many prior turns are passed to the generator
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Output budget for generated off-ramp replies
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Timeout applied around each generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Failed generations within five minutes that pause a provider
    #[serde(default = "default_breaker_failure_threshold")]
    pub breaker_failure_threshold: u32,
    /// How long a paused provider is skipped
    #[serde(default = "default_breaker_cooldown_secs")]
    pub breaker_cooldown_secs: u64,
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_breaker_failure_threshold() -> u32 {
    BreakerPolicy::default().failure_threshold
}

fn default_breaker_cooldown_secs() -> u64 {
    BreakerPolicy::default().cooldown.as_secs()
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            breaker_failure_threshold: default_breaker_failure_threshold(),
            breaker_cooldown_secs: default_breaker_cooldown_secs(),
        }
    }
}

impl DispatchSettings {
    /// Circuit breaker policy for the generation provider.
    /// A zero threshold is treated as one.
    pub fn breaker_policy(&self) -> BreakerPolicy {
        BreakerPolicy {
            failure_threshold: self.breaker_failure_threshold.max(1),
            cooldown: Duration::from_secs(self.breaker_cooldown_secs),
            ..BreakerPolicy::default()
        }
    }
}

impl MediatorConfig {
    /// Load config from ~/.mediator/config.toml
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mediator")
            .join("config.toml")
    }

    /// Get the default LLM provider from config
    pub fn default_provider(&self) -> Option<Provider> {
        self.llm
            .default_provider
            .as_deref()
            .and_then(Provider::from_str)
    }
}
