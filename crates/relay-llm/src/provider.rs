//! # Chat model trait
//!
//! The pipeline hands a [`ChatModel`] the guild's session and the parts of
//! the new user turn. The model reads the session history to build its
//! request and, only when the call succeeds, appends the user/model exchange
//! to the session. A failed call leaves the history untouched.

use async_trait::async_trait;
use relay_core::{ChatSession, ContentPart};

/// Result type alias for model operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while calling the model.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed. The request URL is stripped on conversion.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication failed (invalid or missing key).
    #[error("Auth error: {message}")]
    Auth {
        /// Error description.
        message: String,
    },

    /// Provider returned an API error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Provider-specific error code.
        code: Option<String>,
    },

    /// The prompt or the response was blocked by the provider.
    #[error("Blocked: {reason}")]
    Blocked {
        /// Block or finish reason reported by the provider.
        reason: String,
    },

    /// The provider answered without any text.
    #[error("Empty response from model")]
    EmptyResponse,

    /// Provider-specific error.
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

impl ProviderError {
    /// Error category string for log fields.
    pub fn category(&self) -> &str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Auth { .. } => "auth",
            Self::Api { .. } => "api",
            Self::Blocked { .. } => "blocked",
            Self::EmptyResponse => "empty",
            Self::Other { .. } => "unknown",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.without_url())
    }
}

/// Core chat model trait.
///
/// Implementors must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Current model ID (e.g., `"gemini-2.5-flash"`).
    fn model(&self) -> &str;

    /// Send one user turn and return the model's raw reply text.
    ///
    /// On success the exchange is appended to `session`.
    async fn send_message(
        &self,
        session: &ChatSession,
        parts: Vec<ContentPart>,
    ) -> ProviderResult<String>;
}
