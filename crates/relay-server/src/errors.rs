//! Server error types.

use thiserror::Error;

/// Errors starting or running the HTTP listener.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding the listen address failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested `host:port`.
        addr: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Other socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
