//! [`ChatChannel`] over a Discord channel.

use std::sync::Arc;

use async_trait::async_trait;
use relay_runtime::{ChannelError, ChatChannel, TypingIndicator};
use serenity::http::Http;
use serenity::model::id::ChannelId;

/// Discord's per-message character limit.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Cut `text` to Discord's message limit, on a character boundary.
pub fn fit_message(text: &str) -> &str {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// A Discord text or voice channel the pipeline can talk back to.
#[derive(Clone)]
pub struct DiscordChannel {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl DiscordChannel {
    /// Channel handle over a shared HTTP client.
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl ChatChannel for DiscordChannel {
    async fn send(&self, text: &str) -> Result<(), ChannelError> {
        self.channel_id
            .say(&self.http, fit_message(text))
            .await
            .map(|_| ())
            .map_err(|e| ChannelError::new(e.to_string()))
    }

    fn start_typing(&self) -> TypingIndicator {
        // serenity stops the indicator when the `Typing` handle drops.
        TypingIndicator::new(self.channel_id.start_typing(&self.http))
    }
}
