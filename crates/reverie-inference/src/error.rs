//! Error types for the inference client.

use thiserror::Error;

/// Result type alias using the inference error type.
pub type Result<T> = std::result::Result<T, InferenceError>;

/// Error type for inference operations.
///
/// The client performs no retries; callers decide retry policy. Transport
/// errors, timeouts, and non-success responses all collapse into
/// [`InferenceError::Unavailable`].
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The inference service could not be reached or returned a failure.
    #[error("Inference service unavailable: {0}")]
    Unavailable(String),

    /// Client construction or configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Unavailable(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            InferenceError::Unavailable(format!("Connection failed: {}", err))
        } else {
            InferenceError::Unavailable(err.to_string())
        }
    }
}
