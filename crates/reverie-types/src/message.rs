//! Chat message types for user/character conversations.

use serde::{Deserialize, Serialize};

use crate::{Id, Timestamp, now};

/// Who authored a persisted turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    User,
    Ai,
}

impl MessageType {
    /// Stable string form used in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::User => "USER",
            MessageType::Ai => "AI",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(MessageType::User),
            "AI" => Some(MessageType::Ai),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single persisted turn in a user/character conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Id,
    pub user_id: Id,
    pub character_id: Id,
    pub message: String,
    pub message_type: MessageType,
    /// Session grouping token; `None` means no session grouping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub created_at: Timestamp,
}

impl ChatMessage {
    /// Create a new message with a placeholder id (assigned on insert).
    pub fn new(
        user_id: Id,
        character_id: Id,
        message: impl Into<String>,
        message_type: MessageType,
        session_id: Option<String>,
    ) -> Self {
        Self {
            id: 0,
            user_id,
            character_id,
            message: message.into(),
            message_type,
            session_id,
            created_at: now(),
        }
    }
}

/// History projection handed to callers and held in the conversation cache.
///
/// Carries no foreign-key objects, only what a history view needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub timestamp: Timestamp,
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(message: &ChatMessage) -> Self {
        Self {
            text: message.message.clone(),
            kind: message.message_type,
            timestamp: message.created_at,
        }
    }
}
