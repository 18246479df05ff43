//! Story documents attached to a character.

use serde::{Deserialize, Serialize};

use crate::{Id, Timestamp, now};

/// A story document owned by a character.
///
/// The embedding is filled in asynchronously after creation; a story with no
/// embedding is excluded from similarity search and remains eligible for
/// (re)embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: Id,
    pub character_id: Id,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Story {
    /// Create a new story with a placeholder id (assigned on insert).
    pub fn new(character_id: Id, title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: 0,
            character_id,
            title: title.into(),
            content: content.into(),
            embedding: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a non-empty embedding vector is present.
    pub fn has_embedding(&self) -> bool {
        self.embedding.as_ref().is_some_and(|v| !v.is_empty())
    }
}
