//! HTTP client for the external inference service.
//!
//! The service exposes two operations: generate a persona-driven reply for a
//! user message, and turn a text blob into an embedding vector. The client is
//! a pure I/O boundary — best effort, no retries; callers own retry policy.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{InferenceError, Result};
use crate::types::{EmbedRequest, EmbedResponse, ReplyRequest, ReplyResponse};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default request timeout. Reply and embed calls are the only operations
/// that wait on an external service; past this they are failures, not hangs.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the inference client.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Base URL of the inference service.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl InferenceConfig {
    /// Create a config pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create config from the `REVERIE_INFERENCE_URL` environment variable.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("REVERIE_INFERENCE_URL").map_err(|_| {
            InferenceError::Config(
                "REVERIE_INFERENCE_URL environment variable not set".to_string(),
            )
        })?;
        Ok(Self::new(base_url))
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inference Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for inference backends.
///
/// Implemented by [`HttpInference`] for the real service and by
/// [`MockInference`](crate::MockInference) for tests.
#[async_trait]
pub trait Inference: Send + Sync {
    /// Generate a reply for a user message in a character's voice.
    async fn generate_reply(&self, request: &ReplyRequest) -> Result<String>;

    /// Generate an embedding vector for a text blob.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Name of this backend.
    fn name(&self) -> &str;
}

/// A shared inference backend usable across tasks.
pub type SharedInference = Arc<dyn Inference>;

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Client
// ─────────────────────────────────────────────────────────────────────────────

/// Inference client over HTTP.
pub struct HttpInference {
    client: Client,
    config: InferenceConfig,
}

impl HttpInference {
    /// Create a new client from configuration.
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                InferenceError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Create a client from environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(InferenceConfig::from_env()?)
    }

    fn reply_url(&self) -> String {
        format!("{}/chat", self.config.base_url)
    }

    fn embed_url(&self) -> String {
        format!("{}/embed", self.config.base_url)
    }
}

#[async_trait]
impl Inference for HttpInference {
    async fn generate_reply(&self, request: &ReplyRequest) -> Result<String> {
        debug!(
            handle = %request.character_handle,
            message_len = request.message.len(),
            "Requesting reply"
        );

        let response = self
            .client
            .post(self.reply_url())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Unavailable(format!(
                "Reply request failed: HTTP {} - {}",
                status, body
            )));
        }

        let reply: ReplyResponse = response.json().await.map_err(|e| {
            InferenceError::Unavailable(format!("Malformed reply response: {}", e))
        })?;

        Ok(reply.response)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            content: text.to_string(),
        };

        let response = self
            .client
            .post(self.embed_url())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Unavailable(format!(
                "Embed request failed: HTTP {} - {}",
                status, body
            )));
        }

        let result: EmbedResponse = response.json().await.map_err(|e| {
            InferenceError::Unavailable(format!("Malformed embed response: {}", e))
        })?;

        debug!(dimensions = result.embedding.len(), "Received embedding");
        Ok(result.embedding)
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
