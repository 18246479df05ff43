//! Record store implementation using SQLite.
//!
//! The store owns the durable lifetime of users, characters, chat messages,
//! and stories. It exposes narrow create/read/query operations and no
//! business logic; conflicting writes are serialized by SQLite itself, with
//! unique constraints on `users.username` and `characters.name`.

mod character_ops;
mod message_ops;
mod story_ops;
mod user_ops;

pub use story_ops::SimilarStory;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use reverie_types::Timestamp;

// ─────────────────────────────────────────────────────────────────────────────
// Schema Version
// ─────────────────────────────────────────────────────────────────────────────

/// Current schema version.
const SCHEMA_VERSION: i32 = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Record Store
// ─────────────────────────────────────────────────────────────────────────────

/// Record store backed by SQLite.
///
/// Uses WAL mode for concurrent read performance. All access goes through a
/// `Mutex<Connection>`; row writes are atomic from the caller's perspective.
pub struct RecordStore {
    pub(crate) conn: Mutex<Connection>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Initialization
// ─────────────────────────────────────────────────────────────────────────────

impl RecordStore {
    /// Open or create a record store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::InvalidData(format!("Cannot create {:?}: {}", parent, e))
            })?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;

        info!("Record store opened at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;

        debug!("In-memory record store created");
        Ok(store)
    }

    /// Initialize the database with pragmas and schema.
    fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        self.create_schema(&conn)?;
        Ok(())
    }

    /// Create the database schema.
    fn create_schema(&self, conn: &Connection) -> Result<()> {
        let current_version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        if current_version >= SCHEMA_VERSION {
            debug!("Schema up to date (version {})", current_version);
            return Ok(());
        }

        conn.execute_batch(
            r#"
            -- Users: identity is authenticated upstream, no credentials here
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT,
                created_at TEXT NOT NULL
            );

            -- AI characters with persona fields
            CREATE TABLE IF NOT EXISTS characters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                personality TEXT,
                speaking_style TEXT,
                age INTEGER NOT NULL,
                occupation TEXT,
                background TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Conversation turns, USER or AI
            CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                character_id INTEGER NOT NULL REFERENCES characters(id),
                message TEXT NOT NULL,
                message_type TEXT NOT NULL,
                session_id TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chat_messages_conversation
                ON chat_messages(user_id, character_id, created_at);

            CREATE INDEX IF NOT EXISTS idx_chat_messages_session
                ON chat_messages(session_id);

            -- Story documents; embedding filled in asynchronously
            CREATE TABLE IF NOT EXISTS stories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_stories_character
                ON stories(character_id);
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        info!("Schema created (version {})", SCHEMA_VERSION);
        Ok(())
    }

    /// Get database statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().unwrap();

        let user_count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let character_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM characters", [], |row| row.get(0))?;
        let message_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM chat_messages", [], |row| row.get(0))?;
        let story_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM stories", [], |row| row.get(0))?;
        let embedded_story_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM stories WHERE embedding IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        Ok(StoreStats {
            user_count: user_count as usize,
            character_count: character_count as usize,
            message_count: message_count as usize,
            story_count: story_count as usize,
            embedded_story_count: embedded_story_count as usize,
            schema_version: SCHEMA_VERSION,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a stored RFC 3339 timestamp.
pub(crate) fn parse_timestamp(text: &str) -> Result<Timestamp> {
    chrono::DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| StoreError::InvalidData(format!("Bad timestamp '{}': {}", text, e)))
}

/// Store statistics.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Number of users.
    pub user_count: usize,
    /// Number of characters.
    pub character_count: usize,
    /// Number of chat messages.
    pub message_count: usize,
    /// Number of stories.
    pub story_count: usize,
    /// Number of stories with an embedding.
    pub embedded_story_count: usize,
    /// Schema version.
    pub schema_version: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_types::{Character, ChatMessage, MessageType, Story, User};

    fn create_test_store() -> RecordStore {
        RecordStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        let store = create_test_store();
        let stats = store.stats().unwrap();
        assert_eq!(stats.user_count, 0);
        assert_eq!(stats.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reverie.db");

        let store = RecordStore::open(&path).unwrap();
        store.insert_user(&User::new("alice")).unwrap();
        drop(store);

        // Reopen and confirm the row survived.
        let store = RecordStore::open(&path).unwrap();
        assert!(store.find_user_by_username("alice").unwrap().is_some());
    }

    #[test]
    fn test_stats_counts() {
        let store = create_test_store();

        let user = store.insert_user(&User::new("alice")).unwrap();
        let character = store.insert_character(&Character::new("Nova", 23)).unwrap();
        store
            .insert_message(&ChatMessage::new(
                user.id,
                character.id,
                "hello",
                MessageType::User,
                None,
            ))
            .unwrap();
        let story = store
            .insert_story(&Story::new(character.id, "Origin", "once upon a time"))
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.user_count, 1);
        assert_eq!(stats.character_count, 1);
        assert_eq!(stats.message_count, 1);
        assert_eq!(stats.story_count, 1);
        assert_eq!(stats.embedded_story_count, 0);

        store.set_story_embedding(story.id, &[0.1, 0.2]).unwrap();
        assert_eq!(store.stats().unwrap().embedded_story_count, 1);
    }
}
