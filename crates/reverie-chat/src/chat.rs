//! Conversation orchestration.
//!
//! One `send_message` call is a single logical unit: resolve identity,
//! persist the user turn, request the reply, persist the AI turn, update the
//! cache. The user turn is durably written before the reply is requested —
//! history never shows an AI reply without its preceding user message. A
//! failed reply is contained: the caller gets a fallback envelope with
//! `success == false` and the user turn stays persisted.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use reverie_cache::{CacheConfig, TtlCache};
use reverie_inference::{Inference, ReplyRequest, SharedInference};
use reverie_store::RecordStore;
use reverie_types::{Character, ChatMessage, HistoryEntry, Id, MessageType};

use crate::error::{ChatError, Result};
use crate::persona::PersonaResolver;

/// User-facing reply text when the inference service cannot be reached.
pub const FALLBACK_REPLY: &str = "The AI service could not be reached. Please try again shortly.";

/// How far back the conversation history projection looks.
const CONVERSATION_WINDOW_HOURS: i64 = 24;

/// Reply envelope returned to callers.
///
/// `success` is `false` exactly when `error` is set; a failed reply still
/// carries the fallback text in `response` so callers can show something.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    pub session_id: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

impl ChatReply {
    fn replied(response: String, session_id: Option<String>) -> Self {
        Self {
            response,
            session_id,
            success: true,
            error: None,
        }
    }

    fn fallback(session_id: Option<String>) -> Self {
        Self {
            response: FALLBACK_REPLY.to_string(),
            session_id,
            success: false,
            error: Some(FALLBACK_REPLY.to_string()),
        }
    }
}

/// The conversation orchestrator.
///
/// Cheap to clone; clones share the store, caches, and inference client.
/// Independent `(user, character)` pairs proceed fully in parallel — the
/// store serializes conflicting row writes and the cache tolerates lost
/// updates, so no extra mutual exclusion is imposed.
#[derive(Clone)]
pub struct ChatService {
    store: Arc<RecordStore>,
    inference: SharedInference,
    history_cache: TtlCache<Vec<HistoryEntry>>,
    session_index: TtlCache<(Id, Id)>,
    personas: Arc<PersonaResolver>,
}

impl ChatService {
    /// Create a chat service with default cache configuration (24 h TTL).
    pub fn new(store: Arc<RecordStore>, inference: SharedInference) -> Self {
        Self::with_cache_config(store, inference, CacheConfig::default())
    }

    /// Create a chat service with explicit cache configuration.
    pub fn with_cache_config(
        store: Arc<RecordStore>,
        inference: SharedInference,
        cache_config: CacheConfig,
    ) -> Self {
        Self {
            store,
            inference,
            history_cache: TtlCache::new(cache_config.clone()),
            session_index: TtlCache::new(cache_config),
            personas: Arc::new(PersonaResolver::default()),
        }
    }

    /// Replace the persona resolver.
    pub fn with_personas(mut self, personas: PersonaResolver) -> Self {
        self.personas = Arc::new(personas);
        self
    }

    /// Exchange one message with a character, with session bookkeeping.
    ///
    /// An absent or empty `session_id` starts a fresh session with a
    /// generated token.
    pub async fn send_message(
        &self,
        username: &str,
        character_id: Id,
        text: &str,
        session_id: Option<String>,
    ) -> Result<ChatReply> {
        let user = self
            .store
            .find_user_by_username(username)?
            .ok_or_else(|| ChatError::UserNotFound(username.to_string()))?;
        let character = self
            .store
            .find_character_by_id(character_id)?
            .ok_or(ChatError::CharacterNotFound(character_id))?;

        let session = session_id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // The user turn is durable before the reply is requested.
        self.store.insert_message(&ChatMessage::new(
            user.id,
            character.id,
            text,
            MessageType::User,
            Some(session.clone()),
        ))?;

        let request = ReplyRequest::new(
            text,
            self.personas.resolve(&character.name),
            build_character_context(&character),
        );

        let reply = match self.inference.generate_reply(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    username,
                    character_id,
                    session = %session,
                    error = %e,
                    "Reply request failed; returning fallback"
                );
                // No AI turn is written for a failed call.
                return Ok(ChatReply::fallback(Some(session)));
            }
        };

        self.store.insert_message(&ChatMessage::new(
            user.id,
            character.id,
            &reply,
            MessageType::Ai,
            Some(session.clone()),
        ))?;

        // Invalidate after the durable write so the next history read
        // rebuilds with the new AI turn included.
        self.history_cache
            .invalidate(&history_key(user.id, character.id))
            .await;
        self.session_index
            .put(&session_key(&session), (user.id, character.id))
            .await;

        debug!(username, character_id, session = %session, "Exchange complete");
        Ok(ChatReply::replied(reply, Some(session)))
    }

    /// Exchange one message without session bookkeeping.
    ///
    /// No turns are persisted and the cache is untouched; failure
    /// containment matches [`send_message`](Self::send_message).
    pub async fn send_simple_message(&self, character_id: Id, text: &str) -> Result<ChatReply> {
        let character = self
            .store
            .find_character_by_id(character_id)?
            .ok_or(ChatError::CharacterNotFound(character_id))?;

        let request = ReplyRequest::new(
            text,
            self.personas.resolve(&character.name),
            build_character_context(&character),
        );

        match self.inference.generate_reply(&request).await {
            Ok(reply) => Ok(ChatReply::replied(reply, None)),
            Err(e) => {
                warn!(character_id, error = %e, "Simple reply request failed");
                Ok(ChatReply::fallback(None))
            }
        }
    }

    /// Conversation history between a user and a character, oldest first,
    /// at most `limit` entries.
    ///
    /// Cache-through: a fresh cached projection is returned directly;
    /// otherwise the last 24 hours are read from the store and cached.
    pub async fn conversation_history(
        &self,
        user_id: Id,
        character_id: Id,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>> {
        let key = history_key(user_id, character_id);

        if let Some(mut entries) = self.history_cache.get(&key).await {
            entries.truncate(limit);
            return Ok(entries);
        }

        let since = reverie_types::now() - Duration::hours(CONVERSATION_WINDOW_HOURS);
        let entries: Vec<HistoryEntry> = self
            .store
            .find_conversation_since(user_id, character_id, since)?
            .iter()
            .map(HistoryEntry::from)
            .collect();

        self.history_cache.put(&key, entries.clone()).await;

        let mut result = entries;
        result.truncate(limit);
        Ok(result)
    }

    /// Full history of one session, oldest first.
    ///
    /// Always reads the store directly — exact session replay must not be
    /// filtered by the 24-hour window or a limit.
    pub async fn session_history(&self, session_id: &str) -> Result<Vec<HistoryEntry>> {
        let entries = self
            .store
            .find_by_session(session_id)?
            .iter()
            .map(HistoryEntry::from)
            .collect();
        Ok(entries)
    }

    /// Look up which `(user, character)` pair a session belongs to, if its
    /// marker is still live.
    pub async fn session_owner(&self, session_id: &str) -> Option<(Id, Id)> {
        self.session_index.get(&session_key(session_id)).await
    }

    /// Total persisted message count between a user and a character.
    pub fn conversation_count(&self, user_id: Id, character_id: Id) -> Result<usize> {
        Ok(self.store.count_conversation(user_id, character_id)?)
    }

    /// A page of a user's history across all characters, newest first.
    pub fn user_history(
        &self,
        username: &str,
        page: usize,
        size: usize,
    ) -> Result<Vec<HistoryEntry>> {
        let user = self
            .store
            .find_user_by_username(username)?
            .ok_or_else(|| ChatError::UserNotFound(username.to_string()))?;

        let entries = self
            .store
            .find_by_user_paged(user.id, page, size)?
            .iter()
            .map(HistoryEntry::from)
            .collect();
        Ok(entries)
    }
}

/// Cache key for a `(user, character)` history projection.
fn history_key(user_id: Id, character_id: Id) -> String {
    format!("user:{}:character:{}", user_id, character_id)
}

/// Cache key for a session ownership marker.
fn session_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

/// Character context sent with every reply request: name line, then
/// description and personality lines when present.
fn build_character_context(character: &Character) -> String {
    let mut info = String::new();
    info.push_str(&format!("Name: {}\n", character.name));
    if let Some(description) = &character.description {
        info.push_str(&format!("Description: {}\n", description));
    }
    if let Some(personality) = &character.personality {
        info.push_str(&format!("Personality: {}\n", personality));
    }
    info
}
