//! Configuration for the editor session and the assistant
//!
//! Loaded from TOML. Every field has a default so a partial (or empty) file is
//! valid. The API key itself is never stored in the file: the config names the
//! environment variable that holds it.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::session::ViewMode;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub assistant: AssistantConfig,
}

impl Config {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(raw).context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in config file {}", path.display()))
    }

    fn validate(&self) -> anyhow::Result<()> {
        let retry = &self.assistant.retry;
        anyhow::ensure!(retry.max_attempts >= 1, "assistant.retry.max_attempts must be at least 1");
        anyhow::ensure!(retry.multiplier >= 1.0, "assistant.retry.multiplier must be >= 1.0");
        anyhow::ensure!(
            self.assistant.request_timeout_ms > 0,
            "assistant.request_timeout_ms must be positive"
        );
        Ok(())
    }
}

/// Editor session settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Viewport the canvas opens with
    pub default_view_mode: ViewMode,
}

/// Text generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Model name sent with each request
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-attempt timeout
    pub request_timeout_ms: u64,
    pub retry: RetryConfig,
}

impl AssistantConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_ms: 30_000,
            retry: RetryConfig::default(),
        }
    }
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            multiplier: 2.0,
        }
    }
}
