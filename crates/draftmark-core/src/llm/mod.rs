//! Language-model collaborator
//!
//! The grading engine depends on a single capability: given an ordered list
//! of role/content messages, return one completed assistant text response.
//! The client is passed into the engine rather than held as process-wide
//! state, so tests can substitute scripted doubles.

pub mod anthropic;

use crate::error::Result;
use serde::{Deserialize, Serialize};

pub use anthropic::{AnthropicClient, LlmConfig};

/// Conversation role on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the ordered conversation sent to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The single capability the grading engine needs from a model provider
pub trait CompletionClient {
    /// Send the ordered conversation, receive the full assistant response
    fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// Serializes tests that read or write DRAFTMARK_* environment variables.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serializes_with_lowercase_role() {
        let msg = Message::user("grade this");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "grade this");
    }
}
