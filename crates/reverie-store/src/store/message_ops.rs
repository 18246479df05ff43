//! Chat message persistence and conversation queries.

use rusqlite::params;
use tracing::debug;

use reverie_types::{ChatMessage, Id, MessageType, Timestamp};

use super::{RecordStore, parse_timestamp};
use crate::error::{Result, StoreError};

impl RecordStore {
    /// Insert a new chat message, returning it with its assigned id.
    pub fn insert_message(&self, message: &ChatMessage) -> Result<ChatMessage> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO chat_messages (user_id, character_id, message, message_type,
                                       session_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                message.user_id,
                message.character_id,
                message.message,
                message.message_type.as_str(),
                message.session_id,
                message.created_at.to_rfc3339(),
            ],
        )?;

        let mut stored = message.clone();
        stored.id = conn.last_insert_rowid();

        debug!(
            message_id = stored.id,
            message_type = %stored.message_type,
            "Inserted chat message"
        );
        Ok(stored)
    }

    /// Messages between a user and a character since the given time,
    /// oldest first.
    pub fn find_conversation_since(
        &self,
        user_id: Id,
        character_id: Id,
        since: Timestamp,
    ) -> Result<Vec<ChatMessage>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, character_id, message, message_type, session_id, created_at
            FROM chat_messages
            WHERE user_id = ?1 AND character_id = ?2 AND created_at >= ?3
            ORDER BY created_at ASC, id ASC
            "#,
        )?;
        let mut rows = stmt.query(params![user_id, character_id, since.to_rfc3339()])?;

        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(Self::row_to_message(row)?);
        }
        Ok(messages)
    }

    /// All messages under a session id, oldest first.
    ///
    /// Used for exact session replay; no time window or limit applies.
    pub fn find_by_session(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, character_id, message, message_type, session_id, created_at
            FROM chat_messages
            WHERE session_id = ?1
            ORDER BY created_at ASC, id ASC
            "#,
        )?;
        let mut rows = stmt.query(params![session_id])?;

        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(Self::row_to_message(row)?);
        }
        Ok(messages)
    }

    /// A page of a user's messages across all characters, newest first.
    pub fn find_by_user_paged(
        &self,
        user_id: Id,
        page: usize,
        size: usize,
    ) -> Result<Vec<ChatMessage>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, character_id, message, message_type, session_id, created_at
            FROM chat_messages
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )?;
        let mut rows = stmt.query(params![user_id, size as i64, (page * size) as i64])?;

        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(Self::row_to_message(row)?);
        }
        Ok(messages)
    }

    /// Total message count between a user and a character.
    pub fn count_conversation(&self, user_id: Id, character_id: Id) -> Result<usize> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chat_messages WHERE user_id = ?1 AND character_id = ?2",
            params![user_id, character_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn row_to_message(row: &rusqlite::Row<'_>) -> Result<ChatMessage> {
        let message_type: String = row.get(4)?;
        let created_at: String = row.get(6)?;

        Ok(ChatMessage {
            id: row.get(0)?,
            user_id: row.get(1)?,
            character_id: row.get(2)?,
            message: row.get(3)?,
            message_type: MessageType::parse(&message_type).ok_or_else(|| {
                StoreError::InvalidData(format!("Unknown message type '{}'", message_type))
            })?,
            session_id: row.get(5)?,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use reverie_types::{Character, User};

    fn seed(store: &RecordStore) -> (Id, Id) {
        let user = store.insert_user(&User::new("alice")).unwrap();
        let character = store.insert_character(&Character::new("Nova", 23)).unwrap();
        (user.id, character.id)
    }

    fn message_at(
        user_id: Id,
        character_id: Id,
        text: &str,
        kind: MessageType,
        session: Option<&str>,
        at: Timestamp,
    ) -> ChatMessage {
        let mut message =
            ChatMessage::new(user_id, character_id, text, kind, session.map(String::from));
        message.created_at = at;
        message
    }

    #[test]
    fn test_conversation_since_orders_oldest_first() {
        let store = RecordStore::open_in_memory().unwrap();
        let (user_id, character_id) = seed(&store);

        let base = reverie_types::now();
        for (i, text) in ["first", "second", "third"].iter().enumerate() {
            store
                .insert_message(&message_at(
                    user_id,
                    character_id,
                    text,
                    MessageType::User,
                    None,
                    base + Duration::seconds(i as i64),
                ))
                .unwrap();
        }

        let messages = store
            .find_conversation_since(user_id, character_id, base - Duration::hours(1))
            .unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].message, "first");
        assert_eq!(messages[2].message, "third");
    }

    #[test]
    fn test_conversation_since_filters_window() {
        let store = RecordStore::open_in_memory().unwrap();
        let (user_id, character_id) = seed(&store);

        let now = reverie_types::now();
        store
            .insert_message(&message_at(
                user_id,
                character_id,
                "ancient",
                MessageType::User,
                None,
                now - Duration::hours(48),
            ))
            .unwrap();
        store
            .insert_message(&message_at(
                user_id,
                character_id,
                "recent",
                MessageType::User,
                None,
                now,
            ))
            .unwrap();

        let messages = store
            .find_conversation_since(user_id, character_id, now - Duration::hours(24))
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "recent");
    }

    #[test]
    fn test_find_by_session() {
        let store = RecordStore::open_in_memory().unwrap();
        let (user_id, character_id) = seed(&store);

        let base = reverie_types::now();
        store
            .insert_message(&message_at(
                user_id,
                character_id,
                "hello",
                MessageType::User,
                Some("s-1"),
                base,
            ))
            .unwrap();
        store
            .insert_message(&message_at(
                user_id,
                character_id,
                "hi alice",
                MessageType::Ai,
                Some("s-1"),
                base + Duration::seconds(1),
            ))
            .unwrap();
        store
            .insert_message(&message_at(
                user_id,
                character_id,
                "other session",
                MessageType::User,
                Some("s-2"),
                base + Duration::seconds(2),
            ))
            .unwrap();

        let messages = store.find_by_session("s-1").unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message_type, MessageType::User);
        assert_eq!(messages[1].message_type, MessageType::Ai);
    }

    #[test]
    fn test_paged_user_history_newest_first() {
        let store = RecordStore::open_in_memory().unwrap();
        let (user_id, character_id) = seed(&store);

        let base = reverie_types::now();
        for i in 0..5 {
            store
                .insert_message(&message_at(
                    user_id,
                    character_id,
                    &format!("m{}", i),
                    MessageType::User,
                    None,
                    base + Duration::seconds(i),
                ))
                .unwrap();
        }

        let first_page = store.find_by_user_paged(user_id, 0, 2).unwrap();
        assert_eq!(first_page.len(), 2);
        assert_eq!(first_page[0].message, "m4");
        assert_eq!(first_page[1].message, "m3");

        let second_page = store.find_by_user_paged(user_id, 1, 2).unwrap();
        assert_eq!(second_page[0].message, "m2");
    }

    #[test]
    fn test_count_conversation() {
        let store = RecordStore::open_in_memory().unwrap();
        let (user_id, character_id) = seed(&store);

        assert_eq!(store.count_conversation(user_id, character_id).unwrap(), 0);

        store
            .insert_message(&ChatMessage::new(
                user_id,
                character_id,
                "hello",
                MessageType::User,
                None,
            ))
            .unwrap();

        assert_eq!(store.count_conversation(user_id, character_id).unwrap(), 1);
    }
}
