//! User management endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use reverie_types::User;

use crate::error::Result;
use crate::state::AppState;

/// Request body for user creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// POST /api/v1/users
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let mut user = User::new(request.username);
    user.email = request.email;

    let stored = state.store.insert_user(&user)?;
    Ok((StatusCode::CREATED, Json(stored)))
}
