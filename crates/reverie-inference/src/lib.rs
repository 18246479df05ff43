//! Client for the external inference and embedding service.
//!
//! Two operations cross this boundary: generating a persona-driven reply and
//! turning a text blob into an embedding vector. Any transport error,
//! timeout, or non-success response surfaces as a single
//! [`InferenceError::Unavailable`] condition; the client never retries.

mod client;
mod error;
mod mock;
mod types;

pub use client::{
    DEFAULT_TIMEOUT, HttpInference, Inference, InferenceConfig, SharedInference,
};
pub use error::{InferenceError, Result};
pub use mock::MockInference;
pub use types::{EmbedRequest, EmbedResponse, ReplyRequest, ReplyResponse};

/// Dimensionality of the vectors the inference service produces.
pub const EMBEDDING_DIMS: usize = 1536;
