//! Store configuration, persisted as `config.toml` in the store root.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DraftmarkError, Result};
use crate::llm::anthropic::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECONDS, MAX_RETRY_ATTEMPTS,
};
use crate::llm::LlmConfig;

pub const CONFIG_FILE: &str = "config.toml";

/// Grading-related settings a teacher can tune per store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingSettings {
    /// Model identifier sent to the completion API.
    pub model: String,
    /// Upper bound on generated tokens per grading call.
    pub max_tokens: u32,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Retry attempts for transient upstream failures.
    pub max_retries: u32,
}

impl Default for GradingSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_retries: MAX_RETRY_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub grading: GradingSettings,
}

impl StoreConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: StoreConfig = toml::from_str(&raw)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = toml::to_string_pretty(self).map_err(|e| {
            DraftmarkError::FailedOperation {
                operation: "serialize config".to_string(),
                reason: e.to_string(),
            }
        })?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Build the completion-client configuration: `config.toml` values as the
    /// base, with environment variables taking precedence.
    pub fn llm_config(&self) -> LlmConfig {
        let mut config = LlmConfig {
            model: self.grading.model.clone(),
            max_tokens: self.grading.max_tokens,
            timeout_seconds: self.grading.timeout_seconds,
            max_retries: self.grading.max_retries,
            ..LlmConfig::default()
        };
        config.apply_env();
        config
    }
}
