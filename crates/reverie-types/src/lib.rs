//! Shared domain types for the Reverie character chat service.

pub mod character;
pub mod message;
pub mod story;
pub mod user;

pub use character::Character;
pub use message::{ChatMessage, HistoryEntry, MessageType};
pub use story::Story;
pub use user::User;

/// Identifier for durable records (SQLite rowid).
pub type Id = i64;

/// Timestamp type used across the workspace.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Current time, UTC.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}
