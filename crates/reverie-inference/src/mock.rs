//! Mock inference backend for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::Inference;
use crate::error::{InferenceError, Result};
use crate::types::ReplyRequest;

/// A mock inference backend.
///
/// Generates deterministic embeddings from text content so similarity tests
/// behave the same on every run, returns a fixed reply text, and can be
/// switched into failure modes to exercise error containment.
pub struct MockInference {
    dimensions: usize,
    reply: String,
    fail_replies: bool,
    fail_embeds: bool,
    reply_calls: Mutex<Vec<ReplyRequest>>,
}

impl MockInference {
    /// Create a mock with the given embedding dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            reply: "mock reply".to_string(),
            fail_replies: false,
            fail_embeds: false,
            reply_calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the fixed reply text.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    /// Fail every call with `Unavailable`.
    pub fn failing(mut self) -> Self {
        self.fail_replies = true;
        self.fail_embeds = true;
        self
    }

    /// Fail only embedding calls; replies keep working.
    pub fn failing_embeds(mut self) -> Self {
        self.fail_embeds = true;
        self
    }

    /// Reply requests seen so far.
    pub fn reply_calls(&self) -> Vec<ReplyRequest> {
        self.reply_calls.lock().unwrap().clone()
    }
}

impl Default for MockInference {
    /// A mock producing vectors of the service's real dimensionality.
    fn default() -> Self {
        Self::new(crate::EMBEDDING_DIMS)
    }
}

#[async_trait]
impl Inference for MockInference {
    async fn generate_reply(&self, request: &ReplyRequest) -> Result<String> {
        self.reply_calls.lock().unwrap().push(request.clone());

        if self.fail_replies {
            return Err(InferenceError::Unavailable("mock failure".to_string()));
        }
        Ok(self.reply.clone())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail_embeds {
            return Err(InferenceError::Unavailable("mock failure".to_string()));
        }

        // Deterministic pseudo-random unit vector seeded by the text hash.
        let mut state = simple_hash(text);
        let mut embedding = vec![0.0f32; self.dimensions];
        for value in embedding.iter_mut() {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            *value = ((state >> 16) as f32 / 32768.0) - 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        Ok(embedding)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn simple_hash(s: &str) -> u64 {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    hash
}
