//! Character CRUD operations.

use rusqlite::params;
use tracing::debug;

use reverie_types::{Character, Id};

use super::{RecordStore, parse_timestamp};
use crate::error::Result;

impl RecordStore {
    /// Insert a new character, returning it with its assigned id.
    ///
    /// A duplicate name surfaces as [`StoreError::Uniqueness`](crate::StoreError::Uniqueness).
    pub fn insert_character(&self, character: &Character) -> Result<Character> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO characters (name, description, personality, speaking_style,
                                    age, occupation, background, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                character.name,
                character.description,
                character.personality,
                character.speaking_style,
                character.age,
                character.occupation,
                character.background,
                character.created_at.to_rfc3339(),
                character.updated_at.to_rfc3339(),
            ],
        )?;

        let mut stored = character.clone();
        stored.id = conn.last_insert_rowid();

        debug!(character_id = stored.id, name = %stored.name, "Inserted character");
        Ok(stored)
    }

    /// Get a character by id.
    pub fn find_character_by_id(&self, id: Id) -> Result<Option<Character>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, description, personality, speaking_style,
                   age, occupation, background, created_at, updated_at
            FROM characters
            WHERE id = ?1
            "#,
        )?;
        let mut rows = stmt.query(params![id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_character(row)?))
        } else {
            Ok(None)
        }
    }

    /// Get a character by display name.
    pub fn find_character_by_name(&self, name: &str) -> Result<Option<Character>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, description, personality, speaking_style,
                   age, occupation, background, created_at, updated_at
            FROM characters
            WHERE name = ?1
            "#,
        )?;
        let mut rows = stmt.query(params![name])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_character(row)?))
        } else {
            Ok(None)
        }
    }

    /// List all characters ordered by creation time.
    pub fn list_characters(&self) -> Result<Vec<Character>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, description, personality, speaking_style,
                   age, occupation, background, created_at, updated_at
            FROM characters
            ORDER BY created_at ASC, id ASC
            "#,
        )?;
        let mut rows = stmt.query([])?;

        let mut characters = Vec::new();
        while let Some(row) = rows.next()? {
            characters.push(Self::row_to_character(row)?);
        }
        Ok(characters)
    }

    /// Delete a character by id. Its stories are removed with it.
    pub fn delete_character(&self, id: Id) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn.execute("DELETE FROM characters WHERE id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    fn row_to_character(row: &rusqlite::Row<'_>) -> Result<Character> {
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;
        Ok(Character {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            personality: row.get(3)?,
            speaking_style: row.get(4)?,
            age: row.get(5)?,
            occupation: row.get(6)?,
            background: row.get(7)?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
