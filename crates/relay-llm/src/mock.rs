//! Scripted [`ChatModel`] for deterministic tests without API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use relay_core::{ChatSession, ContentPart};

use crate::provider::{ChatModel, ProviderError, ProviderResult};

/// Pre-programmed reply.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Return this text (and record the exchange).
    Text(String),
    /// Fail with [`ProviderError::Other`].
    Error(String),
    /// Wait a duration, then resolve the inner reply.
    Delay(Duration, Box<MockReply>),
}

impl MockReply {
    /// Convenience: a text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Convenience: wrap any reply with a delay.
    pub fn delayed(delay: Duration, inner: MockReply) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// Mock model that returns pre-programmed replies in sequence and records
/// every prompt it receives.
#[derive(Debug, Default)]
pub struct MockModel {
    replies: Mutex<VecDeque<MockReply>>,
    prompts: Mutex<Vec<Vec<ContentPart>>>,
    call_count: AtomicUsize,
}

impl MockModel {
    /// Create with a reply script.
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// Number of `send_message` calls so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<Vec<ContentPart>> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl ChatModel for MockModel {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn send_message(
        &self,
        session: &ChatSession,
        parts: Vec<ContentPart>,
    ) -> ProviderResult<String> {
        let idx = self.call_count.fetch_add(1, Ordering::Relaxed);
        self.prompts.lock().push(parts.clone());

        let Some(mut reply) = self.replies.lock().pop_front() else {
            return Err(ProviderError::Other {
                message: format!("MockModel: no reply configured for call {idx}"),
            });
        };

        loop {
            match reply {
                MockReply::Text(text) => {
                    session.append_exchange(parts, text.clone());
                    return Ok(text);
                }
                MockReply::Error(message) => return Err(ProviderError::Other { message }),
                MockReply::Delay(duration, inner) => {
                    tokio::time::sleep(duration).await;
                    reply = *inner;
                }
            }
        }
    }
}
