// ABOUTME: Defines the CompletionBackend trait - the opaque transcript -> text
// ABOUTME: call the local loop drives. Transport and model choice live outside.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Speaker of one transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A plain text-completion backend with no native tool calling.
///
/// Implementations must not retry on their own behalf; a returned error ends
/// the task.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Produce the next assistant turn for the full transcript.
    async fn complete(&self, transcript: &[ConversationMessage]) -> Result<String, BackendError>;
}
