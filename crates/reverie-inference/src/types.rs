//! Wire types for the inference service API.

use serde::{Deserialize, Serialize};

/// Request body for the reply endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyRequest {
    /// The user's message text.
    pub message: String,

    /// Persona handle selecting a character template server-side.
    #[serde(rename = "character_id")]
    pub character_handle: String,

    /// Character context string (name, description, personality).
    #[serde(rename = "character_info")]
    pub character_context: String,

    /// Optional emotion hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,

    /// Optional emotion intensity in `[0.0, 1.0]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_intensity: Option<f64>,
}

impl ReplyRequest {
    /// Create a reply request with the required fields.
    pub fn new(
        message: impl Into<String>,
        character_handle: impl Into<String>,
        character_context: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            character_handle: character_handle.into(),
            character_context: character_context.into(),
            emotion: None,
            emotion_intensity: None,
        }
    }

    /// Set the emotion hint.
    pub fn with_emotion(mut self, emotion: impl Into<String>, intensity: f64) -> Self {
        self.emotion = Some(emotion.into());
        self.emotion_intensity = Some(intensity);
        self
    }
}

/// Response body from the reply endpoint.
///
/// An empty `response` is a valid, if unhelpful, reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyResponse {
    #[serde(default)]
    pub response: String,
}

/// Request body for the embed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub content: String,
}

/// Response body from the embed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
}
