//! HTTP API server for the Reverie character chat service.
//!
//! Thin transport layer over the domain services: routes deserialize
//! requests, call into [`ChatService`](reverie_chat::ChatService) /
//! [`StoryService`](reverie_chat::StoryService), and map domain errors to
//! status codes. No HTML rendering, no authentication — identity is
//! authenticated upstream.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::AppState;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The Reverie HTTP server.
pub struct Server {
    state: AppState,
    config: ServerConfig,
}

impl Server {
    /// Create a new server from application state and configuration.
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        Self { state, config }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health_routes())
            .nest("/api/v1", api_routes())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind and serve until the process is stopped.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.bind_address).await?;
        info!(address = %self.config.bind_address, "Server listening");
        axum::serve(listener, self.router()).await
    }
}

/// API routes (v1).
fn api_routes() -> Router<AppState> {
    use axum::routing::{delete, get, post};

    Router::new()
        // Chat endpoints
        .route("/chat/send", post(routes::send_handler))
        .route("/chat/simple", post(routes::send_simple_handler))
        .route("/chat/history", get(routes::history_handler))
        .route("/chat/session/{id}", get(routes::session_history_handler))
        // User endpoints
        .route("/users", post(routes::create_user_handler))
        // Character endpoints
        .route(
            "/characters",
            get(routes::list_characters_handler).post(routes::create_character_handler),
        )
        .route("/characters/{id}", get(routes::get_character_handler))
        .route(
            "/characters/{id}/stories",
            get(routes::character_stories_handler),
        )
        // Story endpoints
        .route("/stories", post(routes::create_story_handler))
        .route("/stories/pending", get(routes::pending_stories_handler))
        .route("/stories/search", post(routes::search_stories_handler))
        .route("/stories/{id}/embed", post(routes::embed_story_handler))
        .route("/stories/{id}", delete(routes::delete_story_handler))
}
