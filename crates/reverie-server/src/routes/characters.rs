//! Character management endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use reverie_types::{Character, Id};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Request body for character creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCharacterRequest {
    pub name: String,
    pub age: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub speaking_style: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
}

/// POST /api/v1/characters
pub async fn create_character_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateCharacterRequest>,
) -> Result<(StatusCode, Json<Character>)> {
    let mut character = Character::new(request.name, request.age);
    character.description = request.description;
    character.personality = request.personality;
    character.speaking_style = request.speaking_style;
    character.occupation = request.occupation;
    character.background = request.background;

    let stored = state.store.insert_character(&character)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/v1/characters
pub async fn list_characters_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Character>>> {
    Ok(Json(state.store.list_characters()?))
}

/// GET /api/v1/characters/{id}
pub async fn get_character_handler(
    State(state): State<AppState>,
    Path(character_id): Path<Id>,
) -> Result<Json<Character>> {
    let character = state
        .store
        .find_character_by_id(character_id)?
        .ok_or_else(|| ServerError::NotFound(format!("Character {}", character_id)))?;
    Ok(Json(character))
}
