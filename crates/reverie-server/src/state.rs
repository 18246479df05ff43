//! Application state shared across handlers.

use std::sync::Arc;

use reverie_chat::{ChatService, StoryService};
use reverie_store::RecordStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Conversation orchestrator.
    pub chat: ChatService,

    /// Story and embedding operations.
    pub stories: StoryService,

    /// Record store, for the user/character management routes.
    pub store: Arc<RecordStore>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(chat: ChatService, stories: StoryService, store: Arc<RecordStore>) -> Self {
        Self {
            chat,
            stories,
            store,
        }
    }
}
