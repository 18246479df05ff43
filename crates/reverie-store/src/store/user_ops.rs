//! User CRUD operations.

use rusqlite::params;
use tracing::debug;

use reverie_types::{Id, User};

use super::{RecordStore, parse_timestamp};
use crate::error::Result;

impl RecordStore {
    /// Insert a new user, returning it with its assigned id.
    ///
    /// A duplicate username surfaces as [`StoreError::Uniqueness`](crate::StoreError::Uniqueness).
    pub fn insert_user(&self, user: &User) -> Result<User> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
            params![user.username, user.email, user.created_at.to_rfc3339()],
        )?;

        let mut stored = user.clone();
        stored.id = conn.last_insert_rowid();

        debug!(user_id = stored.id, username = %stored.username, "Inserted user");
        Ok(stored)
    }

    /// Get a user by id.
    pub fn find_user_by_id(&self, id: Id) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt =
            conn.prepare("SELECT id, username, email, created_at FROM users WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_user(row)?))
        } else {
            Ok(None)
        }
    }

    /// Get a user by username.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt =
            conn.prepare("SELECT id, username, email, created_at FROM users WHERE username = ?1")?;
        let mut rows = stmt.query(params![username])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_user(row)?))
        } else {
            Ok(None)
        }
    }

    /// List all users ordered by creation time.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, username, email, created_at FROM users ORDER BY created_at ASC, id ASC",
        )?;
        let mut rows = stmt.query([])?;

        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(Self::row_to_user(row)?);
        }
        Ok(users)
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User> {
        let created_at: String = row.get(3)?;
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}
