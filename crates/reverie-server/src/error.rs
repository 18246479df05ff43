//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use reverie_chat::ChatError;
use reverie_store::StoreError;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate identity field.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Downstream service unavailable (inference, embedding backlog).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ChatError> for ServerError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::UserNotFound(_)
            | ChatError::CharacterNotFound(_)
            | ChatError::StoryNotFound(_) => ServerError::NotFound(e.to_string()),
            ChatError::EmbedQueueFull => ServerError::ServiceUnavailable(e.to_string()),
            ChatError::Inference(_) => ServerError::ServiceUnavailable(e.to_string()),
            ChatError::Store(store) => ServerError::from(store),
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Uniqueness(msg) => ServerError::Conflict(msg),
            StoreError::NotFound(msg) => ServerError::NotFound(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServerError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ServerError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        let body = ErrorResponse {
            code: code.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_mapping() {
        let not_found: ServerError = ChatError::UserNotFound("bob".to_string()).into();
        assert!(matches!(not_found, ServerError::NotFound(_)));

        let backpressure: ServerError = ChatError::EmbedQueueFull.into();
        assert!(matches!(backpressure, ServerError::ServiceUnavailable(_)));

        let conflict: ServerError = ChatError::Store(StoreError::Uniqueness(
            "users.username".to_string(),
        ))
        .into();
        assert!(matches!(conflict, ServerError::Conflict(_)));
    }
}
