//! Story endpoints: creation, re-embedding, similarity search.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use reverie_types::{Id, Story};

use crate::error::Result;
use crate::state::AppState;

/// Request body for story creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStoryRequest {
    pub character_id: Id,
    pub title: String,
    pub content: String,
}

/// Request body for similarity search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub character_id: Id,
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    5
}

/// A search hit with its distance to the query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub story: Story,
    pub distance: f32,
}

/// POST /api/v1/stories
///
/// Returns 201 with the story before its embedding exists; embedding is
/// scheduled and completes eventually.
pub async fn create_story_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateStoryRequest>,
) -> Result<(StatusCode, Json<Story>)> {
    let story = state
        .stories
        .create_story(request.character_id, request.title, request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(story)))
}

/// POST /api/v1/stories/{id}/embed
///
/// Operator re-embed; 202 because the result lands asynchronously.
pub async fn embed_story_handler(
    State(state): State<AppState>,
    Path(story_id): Path<Id>,
) -> Result<StatusCode> {
    state.stories.embed_story(story_id)?;
    Ok(StatusCode::ACCEPTED)
}

/// GET /api/v1/stories/pending
pub async fn pending_stories_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Story>>> {
    Ok(Json(state.stories.stories_without_embedding()?))
}

/// POST /api/v1/stories/search
pub async fn search_stories_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<SearchHit>>> {
    let results = state
        .stories
        .search_similar(&request.query, request.character_id, request.limit)
        .await?;

    Ok(Json(
        results
            .into_iter()
            .map(|hit| SearchHit {
                story: hit.story,
                distance: hit.distance,
            })
            .collect(),
    ))
}

/// DELETE /api/v1/stories/{id}
pub async fn delete_story_handler(
    State(state): State<AppState>,
    Path(story_id): Path<Id>,
) -> Result<StatusCode> {
    state.stories.delete_story(story_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/characters/{id}/stories
pub async fn character_stories_handler(
    State(state): State<AppState>,
    Path(character_id): Path<Id>,
) -> Result<Json<Vec<Story>>> {
    Ok(Json(state.stories.stories_for_character(character_id)?))
}
