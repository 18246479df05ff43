//! Chat endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use reverie_chat::ChatReply;
use reverie_types::{HistoryEntry, Id};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Request body for the session-tracked chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SendRequest {
    /// Username of the sender.
    pub username: String,

    /// Target character id.
    pub character_id: Id,

    /// The message text.
    pub message: String,

    /// Optional session id; absent or empty starts a new session.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Request body for the sessionless chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SimpleSendRequest {
    /// Target character id.
    pub character_id: Id,

    /// The message text.
    pub message: String,
}

/// Reply envelope returned by both chat endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    /// Reply text (the fallback message on failure).
    pub response: String,

    /// Session id the exchange was recorded under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// False exactly when the reply failed.
    pub success: bool,

    /// Failure description, set iff `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ChatReply> for SendResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            response: reply.response,
            session_id: reply.session_id,
            success: reply.success,
            error: reply.error,
        }
    }
}

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Id,
    pub character_id: Id,
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    50
}

/// POST /api/v1/chat/send
pub async fn send_handler(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Result<Json<SendResponse>> {
    if request.message.trim().is_empty() {
        return Err(ServerError::BadRequest("Message must not be empty".to_string()));
    }

    let reply = state
        .chat
        .send_message(
            &request.username,
            request.character_id,
            &request.message,
            request.session_id,
        )
        .await?;

    Ok(Json(reply.into()))
}

/// POST /api/v1/chat/simple
pub async fn send_simple_handler(
    State(state): State<AppState>,
    Json(request): Json<SimpleSendRequest>,
) -> Result<Json<SendResponse>> {
    if request.message.trim().is_empty() {
        return Err(ServerError::BadRequest("Message must not be empty".to_string()));
    }

    let reply = state
        .chat
        .send_simple_message(request.character_id, &request.message)
        .await?;

    Ok(Json(reply.into()))
}

/// GET /api/v1/chat/history
pub async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>> {
    let entries = state
        .chat
        .conversation_history(query.user_id, query.character_id, query.limit)
        .await?;
    Ok(Json(entries))
}

/// GET /api/v1/chat/session/{id}
pub async fn session_history_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>> {
    let entries = state.chat.session_history(&session_id).await?;
    Ok(Json(entries))
}
