//! Persona-driven AI characters.

use serde::{Deserialize, Serialize};

use crate::{Id, Timestamp, now};

/// An AI character with its persona fields.
///
/// Loaded once per orchestration call and treated as immutable for the
/// duration of that call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: Id,
    /// Display name, unique across the store.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaking_style: Option<String>,
    pub age: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Character {
    /// Create a new character with a placeholder id (assigned on insert).
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        let now = now();
        Self {
            id: 0,
            name: name.into(),
            description: None,
            personality: None,
            speaking_style: None,
            age,
            occupation: None,
            background: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the personality.
    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }

    /// Set the speaking style.
    pub fn with_speaking_style(mut self, style: impl Into<String>) -> Self {
        self.speaking_style = Some(style.into());
        self
    }

    /// Set the occupation.
    pub fn with_occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation = Some(occupation.into());
        self
    }

    /// Set the background.
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }
}
