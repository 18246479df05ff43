//! Error types for the chat domain layer.

use thiserror::Error;

use reverie_types::Id;

/// Result type alias for chat domain operations.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors surfaced by the orchestration layer.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Unknown username.
    #[error("User '{0}' not found")]
    UserNotFound(String),

    /// Unknown character id.
    #[error("Character {0} not found")]
    CharacterNotFound(Id),

    /// Unknown story id.
    #[error("Story {0} not found")]
    StoryNotFound(Id),

    /// The embedding backlog is full; the job was not accepted.
    #[error("Embedding queue full")]
    EmbedQueueFull,

    /// Record store failure.
    #[error(transparent)]
    Store(#[from] reverie_store::StoreError),

    /// Inference service failure.
    #[error(transparent)]
    Inference(#[from] reverie_inference::InferenceError),
}

impl ChatError {
    /// Whether this error is a missing-record condition.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ChatError::UserNotFound(_)
                | ChatError::CharacterNotFound(_)
                | ChatError::StoryNotFound(_)
        )
    }
}
