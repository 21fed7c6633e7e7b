//! Anthropic Messages API client
//!
//! Synchronous HTTP over ureq: a single POST per grading attempt with a
//! request timeout, and bounded retry with exponential backoff on transport
//! errors and 5xx responses only. 4xx responses (bad key, bad request) and
//! timeouts are surfaced immediately, never retried.

use std::time::Duration;

use crate::error::{DraftmarkError, Result};
use serde::Deserialize;

use super::{CompletionClient, Message};

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
pub const MAX_RETRY_ATTEMPTS: u32 = 2;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the model provider
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_retries: MAX_RETRY_ATTEMPTS,
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables, clamping numeric
    /// values to sane ranges.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay environment variables onto an existing configuration.
    /// Values from `config.toml` act as the base; the environment wins.
    pub fn apply_env(&mut self) {
        let config = self;

        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.is_empty() {
                config.api_key = key;
            }
        }

        if let Ok(url) = std::env::var("DRAFTMARK_API_URL") {
            if !url.is_empty() {
                config.api_url = url;
            }
        }

        if let Ok(model) = std::env::var("DRAFTMARK_MODEL") {
            if !model.is_empty() {
                config.model = model;
            }
        }

        if let Ok(timeout) = std::env::var("DRAFTMARK_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.timeout_seconds = seconds.clamp(5, 600);
            }
        }

        if let Ok(retries) = std::env::var("DRAFTMARK_RETRIES") {
            if let Ok(count) = retries.parse::<u32>() {
                config.max_retries = count.clamp(0, 10);
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

/// HTTP client for the Anthropic Messages API
pub struct AnthropicClient {
    config: LlmConfig,
}

impl AnthropicClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(DraftmarkError::UsageError(
                "ANTHROPIC_API_KEY is not set".to_string(),
            ));
        }
        Ok(Self { config })
    }

    fn send_once(&self, payload: &str) -> Result<String> {
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        let response = ureq::post(&self.config.api_url)
            .set("Content-Type", "application/json")
            .set("x-api-key", &self.config.api_key)
            .set("anthropic-version", ANTHROPIC_VERSION)
            .timeout(timeout)
            .send_string(payload);

        match response {
            Ok(res) => {
                let body = res.into_string().map_err(|e| DraftmarkError::UpstreamFailure {
                    reason: format!("failed to read response body: {}", e),
                })?;
                extract_text(&body)
            }
            Err(ureq::Error::Status(code, res)) => {
                let detail = res.into_string().unwrap_or_default();
                Err(DraftmarkError::UpstreamFailure {
                    reason: format!("HTTP {}: {}", code, truncate(&detail, 200)),
                })
            }
            Err(ureq::Error::Transport(t)) => {
                let msg = t.to_string();
                if msg.contains("timed out") || msg.contains("timeout") {
                    Err(DraftmarkError::UpstreamTimeout {
                        seconds: self.config.timeout_seconds,
                    })
                } else {
                    Err(DraftmarkError::UpstreamFailure {
                        reason: format!("transport error: {}", msg),
                    })
                }
            }
        }
    }
}

impl CompletionClient for AnthropicClient {
    fn complete(&self, messages: &[Message]) -> Result<String> {
        let payload = serde_json::to_string(&serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": messages,
        }))?;

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(250 * 2_u64.pow(attempt - 1));
                std::thread::sleep(backoff);
                tracing::debug!(attempt, "retrying model request");
            }

            match self.send_once(&payload) {
                Ok(text) => return Ok(text),
                Err(e @ DraftmarkError::UpstreamTimeout { .. }) => return Err(e),
                Err(DraftmarkError::UpstreamFailure { reason })
                    if reason.starts_with("HTTP 4") =>
                {
                    return Err(DraftmarkError::UpstreamFailure { reason });
                }
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        Err(last_error.unwrap_or(DraftmarkError::UpstreamFailure {
            reason: "model request failed".to_string(),
        }))
    }
}

/// Concatenate the text blocks of a Messages API response
fn extract_text(body: &str) -> Result<String> {
    let parsed: ApiResponse =
        serde_json::from_str(body).map_err(|e| DraftmarkError::UpstreamFailure {
            reason: format!("unexpected response shape: {}", e),
        })?;

    let mut full = String::new();
    for block in parsed.content {
        if block.block_type == "text" {
            full.push_str(&block.text);
        }
    }

    if full.is_empty() {
        return Err(DraftmarkError::UpstreamFailure {
            reason: "response contained no text blocks".to_string(),
        });
    }
    Ok(full)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
