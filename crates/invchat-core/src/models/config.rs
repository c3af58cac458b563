//! Configuration structures for invchat.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use invchat_model::{DEFAULT_ENDPOINT, DEFAULT_MODEL, GeminiBackend, GeminiConfig, RetryPolicy};

use crate::error::{InvchatError, Result};

/// Main configuration for invchat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvchatConfig {
    /// Remote model configuration.
    pub model: ModelConfig,

    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Interactive session configuration.
    pub chat: ChatConfig,
}

/// Remote model connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name.
    pub name: String,

    /// API base URL.
    pub endpoint: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Retries after a failed request.
    pub max_retries: u32,

    /// Delay before the first retry, doubled after each one.
    pub initial_backoff_ms: u64,

    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 60,
            max_retries: 2,
            initial_backoff_ms: 500,
            api_key_env: "GOOGLE_API_KEY".to_string(),
        }
    }
}

impl ModelConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_initial_backoff(Duration::from_millis(self.initial_backoff_ms))
    }

    /// Gemini settings for the given API key.
    pub fn gemini(&self, api_key: impl Into<String>) -> GeminiConfig {
        GeminiConfig::new(api_key)
            .with_model(&self.name)
            .with_endpoint(&self.endpoint)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry(self.retry_policy())
    }

    /// Read the API key from `api_key_env` and build the backend.
    pub fn connect(&self) -> Result<GeminiBackend> {
        let key = GeminiConfig::from_env(&self.api_key_env)?.api_key;
        Ok(GeminiBackend::new(self.gemini(key))?)
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Directory scanned for invoice images.
    pub input_dir: PathBuf,

    /// File extensions (lowercase, without dot) treated as images.
    pub extensions: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("invoices"),
            extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        }
    }
}

/// Interactive session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Label printed before the user's input.
    pub prompt_label: String,

    /// Label printed before each answer.
    pub answer_label: String,

    /// Line that ends the session.
    pub exit_command: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            prompt_label: "You:".to_string(),
            answer_label: "Assistant:".to_string(),
            exit_command: "exit".to_string(),
        }
    }
}

impl InvchatConfig {
    /// Load and validate configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| InvchatError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the session cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.model.name.trim().is_empty() {
            return Err(InvchatError::Config("model.name is empty".to_string()));
        }
        if self.model.timeout_secs == 0 {
            return Err(InvchatError::Config(
                "model.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.model.api_key_env.trim().is_empty() {
            return Err(InvchatError::Config("model.api_key_env is empty".to_string()));
        }
        if self.extraction.extensions.is_empty() {
            return Err(InvchatError::Config(
                "extraction.extensions lists no file types".to_string(),
            ));
        }
        if self.chat.exit_command.trim().is_empty() {
            return Err(InvchatError::Config("chat.exit_command is empty".to_string()));
        }
        Ok(())
    }
}
