//! User account types.
//!
//! Identity is authenticated upstream; a user row carries no credentials.

use serde::{Deserialize, Serialize};

use crate::{Id, Timestamp, now};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    /// Login name, unique across the store.
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: Timestamp,
}

impl User {
    /// Create a new user with a placeholder id (assigned on insert).
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: 0,
            username: username.into(),
            email: None,
            created_at: now(),
        }
    }

    /// Set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
