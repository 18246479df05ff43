//! API routes.

pub mod characters;
pub mod chat;
pub mod health;
pub mod stories;
pub mod users;

pub use characters::{
    CreateCharacterRequest, create_character_handler, get_character_handler,
    list_characters_handler,
};
pub use chat::{
    HistoryQuery, SendRequest, SendResponse, SimpleSendRequest, history_handler, send_handler,
    send_simple_handler, session_history_handler,
};
pub use health::health_routes;
pub use stories::{
    CreateStoryRequest, SearchHit, SearchRequest, character_stories_handler,
    create_story_handler, delete_story_handler, embed_story_handler, pending_stories_handler,
    search_stories_handler,
};
pub use users::{CreateUserRequest, create_user_handler};
