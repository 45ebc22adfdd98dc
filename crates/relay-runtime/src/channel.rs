//! The originating chat channel, as seen by the pipeline.

use std::any::Any;

use async_trait::async_trait;
use thiserror::Error;

/// Sending to the chat channel failed.
#[derive(Debug, Error)]
#[error("chat channel error: {message}")]
pub struct ChannelError {
    /// Error description.
    pub message: String,
}

impl ChannelError {
    /// Wrap any displayable error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Keeps a "typing…" indicator alive until dropped.
pub struct TypingIndicator {
    handle: Option<Box<dyn Any + Send>>,
}

impl TypingIndicator {
    /// Hold a platform handle that stops the indicator when dropped.
    pub fn new<T: Any + Send>(handle: T) -> Self {
        Self {
            handle: Some(Box::new(handle)),
        }
    }

    /// An indicator that shows nothing.
    pub fn none() -> Self {
        Self { handle: None }
    }
}

impl std::fmt::Debug for TypingIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingIndicator")
            .field("active", &self.handle.is_some())
            .finish()
    }
}

/// A text channel the pipeline can answer on.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Post a plain text message.
    async fn send(&self, text: &str) -> Result<(), ChannelError>;

    /// Show a typing indicator until the returned guard is dropped.
    fn start_typing(&self) -> TypingIndicator;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    struct StopOnDrop(Arc<AtomicBool>);

    impl Drop for StopOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn dropping_indicator_drops_handle() {
        let stopped = Arc::new(AtomicBool::new(false));
        let indicator = TypingIndicator::new(StopOnDrop(Arc::clone(&stopped)));
        assert!(!stopped.load(Ordering::SeqCst));
        drop(indicator);
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn error_display() {
        assert_eq!(ChannelError::new("403").to_string(), "chat channel error: 403");
    }
}
