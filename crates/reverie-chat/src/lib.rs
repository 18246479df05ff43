//! Conversation orchestration and story embedding for Reverie.
//!
//! This crate is the domain layer between the record store, the
//! conversation cache, and the external inference service:
//!
//! - [`ChatService`] runs the per-message state machine: resolve identity,
//!   persist the user turn, request the reply, persist the AI turn, update
//!   the cache — with inference failures contained to a fallback envelope.
//! - [`StoryService`] owns story creation and distance-ranked retrieval.
//! - [`EmbeddingPipeline`] turns story content into vectors asynchronously
//!   behind a bounded backlog.
//! - [`PersonaResolver`] maps character names to the persona handles the
//!   inference service expects.

mod chat;
mod error;
mod persona;
mod pipeline;
mod story;

pub use chat::{ChatReply, ChatService, FALLBACK_REPLY};
pub use error::{ChatError, Result};
pub use persona::{PersonaResolver, fallback_handle};
pub use pipeline::{DEFAULT_BACKLOG, EmbeddingPipeline, PipelineStats};
pub use story::StoryService;
