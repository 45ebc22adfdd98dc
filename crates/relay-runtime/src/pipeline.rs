//! The serialized per-message workflow.
//!
//! ```text
//! inbound message
//!   → preconditions (own message / guild / active channel / display / empty)
//!   → [global gate]
//!       session → prompt (knowledge + name + body + images) → model
//!       → decode → broadcast
//! ```
//!
//! Every message, from every guild, passes through one async mutex. At most
//! one message is between prompt assembly and broadcast at any instant, so
//! broadcasts leave in the order messages arrived and no two model calls
//! touch a session concurrently. This is the throughput limit of the relay.

use std::sync::Arc;
use std::time::Duration;

use relay_core::{ChannelId, ContentPart, GuildId, SpriteMap};
use relay_llm::{ChatModel, ProviderError};
use relay_settings::ActiveChannelStore;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::attachments::{Attachment, AttachmentFetcher, HttpAttachmentFetcher};
use crate::channel::ChatChannel;
use crate::decode::ResponseDecoder;
use crate::display::DisplaySink;
use crate::images::to_image_data;
use crate::knowledge::KnowledgeStore;
use crate::prompt;
use crate::sessions::SessionRegistry;

/// Posted on the originating channel when no display is connected.
pub const NO_DISPLAY_NOTICE: &str =
    "Ah, Sensei, the display page isn't connected. Please open index.html first!";

/// Who sent an inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    /// Name shown in the guild (nickname, else global name, else username).
    pub display_name: String,
    /// Whether the relay's own bot account sent it.
    pub is_self: bool,
}

/// One inbound chat message, platform-neutral.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    /// Originating guild; `None` for private messages.
    pub guild_id: Option<GuildId>,
    /// Originating channel.
    pub channel_id: ChannelId,
    /// Sender.
    pub author: Author,
    /// Plain-text body (possibly empty).
    pub content: String,
    /// Attachments, in message order.
    pub attachments: Vec<Attachment>,
}

/// Why a message was dropped without any effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Sent by the relay itself.
    OwnMessage,
    /// Not sent in a guild.
    NotInGuild,
    /// Sent outside the active channel.
    InactiveChannel,
    /// No text and no attachments.
    EmptyMessage,
}

/// What handling a message did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Dropped silently.
    Skipped(SkipReason),
    /// No display connected for the guild; a notice was posted.
    NoDisplay,
    /// The reply was broadcast to this many connections.
    Delivered {
        /// Connections that accepted the payload.
        connections: usize,
    },
    /// The model call failed; the error was posted, nothing was broadcast.
    ModelFailed,
}

/// Failures inside the gated section. Reported on the chat channel, never
/// returned to the caller.
#[derive(Debug, Error)]
enum PipelineError {
    #[error(transparent)]
    Model(#[from] ProviderError),
    #[error("model did not answer within {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Serialized message pipeline.
pub struct MessagePipeline {
    model: Arc<dyn ChatModel>,
    sessions: Arc<SessionRegistry>,
    knowledge: Arc<KnowledgeStore>,
    display: Arc<dyn DisplaySink>,
    active_channel: Arc<dyn ActiveChannelStore>,
    fetcher: Arc<dyn AttachmentFetcher>,
    decoder: ResponseDecoder,
    model_timeout: Option<Duration>,
    gate: Mutex<()>,
}

impl MessagePipeline {
    /// Pipeline with the HTTP attachment fetcher, the default sprite table,
    /// and no model timeout.
    pub fn new(
        model: Arc<dyn ChatModel>,
        sessions: Arc<SessionRegistry>,
        knowledge: Arc<KnowledgeStore>,
        display: Arc<dyn DisplaySink>,
        active_channel: Arc<dyn ActiveChannelStore>,
    ) -> Self {
        Self {
            model,
            sessions,
            knowledge,
            display,
            active_channel,
            fetcher: Arc::new(HttpAttachmentFetcher::new()),
            decoder: ResponseDecoder::default(),
            model_timeout: None,
            gate: Mutex::new(()),
        }
    }

    /// Replace the attachment fetcher.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn AttachmentFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace the sprite table.
    #[must_use]
    pub fn with_sprites(mut self, sprites: SpriteMap) -> Self {
        self.decoder = ResponseDecoder::new(sprites);
        self
    }

    /// Bound every model call.
    #[must_use]
    pub fn with_model_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.model_timeout = timeout;
        self
    }

    /// Handle one inbound message end to end.
    #[instrument(skip_all, fields(guild_id, channel_id = %message.channel_id))]
    pub async fn handle(&self, message: InboundMessage, channel: &dyn ChatChannel) -> Outcome {
        let guild_id = match self.check_preconditions(&message) {
            Ok(guild_id) => guild_id,
            Err(reason) => {
                debug!(?reason, "message skipped");
                return Outcome::Skipped(reason);
            }
        };
        let _ = tracing::Span::current().record("guild_id", guild_id.as_str());

        if !self.display.has_clients(&guild_id) {
            info!("no display connected, posting notice");
            if let Err(e) = channel.send(NO_DISPLAY_NOTICE).await {
                warn!(error = %e, "failed to post no-display notice");
            }
            return Outcome::NoDisplay;
        }

        if message.content.trim().is_empty() && message.attachments.is_empty() {
            return Outcome::Skipped(SkipReason::EmptyMessage);
        }

        debug!("waiting for pipeline gate");
        let _gate = self.gate.lock().await;
        self.process(&guild_id, message, channel).await
    }

    /// Preconditions 1 and 2: the sender, the guild context, and the active
    /// channel. The active channel is read fresh for every message.
    fn check_preconditions(&self, message: &InboundMessage) -> Result<GuildId, SkipReason> {
        if message.author.is_self {
            return Err(SkipReason::OwnMessage);
        }
        let guild_id = message.guild_id.clone().ok_or(SkipReason::NotInGuild)?;
        let active = self.active_channel.get();
        if active.is_none() || message.channel_id != active {
            return Err(SkipReason::InactiveChannel);
        }
        Ok(guild_id)
    }

    async fn process(
        &self,
        guild_id: &GuildId,
        message: InboundMessage,
        channel: &dyn ChatChannel,
    ) -> Outcome {
        let session = self.sessions.get_or_create(guild_id);

        let knowledge = self.knowledge.snapshot();
        let mut parts = prompt::assemble(
            &knowledge,
            &message.author.display_name,
            message.content.trim(),
        );
        parts.extend(self.fetch_images(&message.attachments).await);

        let typing = channel.start_typing();
        let raw = match self.call_model(&session, parts).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "model call failed");
                let report = format!("Sorry Sensei, something went wrong while I was thinking: `{e}`");
                if let Err(send_err) = channel.send(&report).await {
                    warn!(error = %send_err, "failed to report model error");
                }
                return Outcome::ModelFailed;
            }
        };
        debug!(raw = %raw, "model reply");

        let payload = self.decoder.decode(&raw);
        let connections = self.display.broadcast(guild_id, &payload).await;
        drop(typing);
        info!(sprite = %payload.sprite, connections, "reply broadcast");
        Outcome::Delivered { connections }
    }

    async fn call_model(
        &self,
        session: &relay_core::ChatSession,
        parts: Vec<ContentPart>,
    ) -> Result<String, PipelineError> {
        let call = self.model.send_message(session, parts);
        match self.model_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| PipelineError::Timeout(limit))?
                .map_err(PipelineError::from),
            None => Ok(call.await?),
        }
    }

    /// Fetch and decode image attachments, skipping any that fail.
    async fn fetch_images(&self, attachments: &[Attachment]) -> Vec<ContentPart> {
        let mut parts = Vec::new();
        for attachment in attachments {
            if !attachment.is_image() {
                debug!(file = %attachment.filename, "ignoring non-image attachment");
                continue;
            }
            let bytes = match self.fetcher.fetch(attachment).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(file = %attachment.filename, error = %e, "attachment fetch failed, skipping");
                    continue;
                }
            };
            match to_image_data(&bytes) {
                Ok(image) => {
                    debug!(file = %attachment.filename, "attachment image added");
                    parts.push(ContentPart::image(image));
                }
                Err(e) => {
                    warn!(file = %attachment.filename, error = %e, "attachment decode failed, skipping");
                }
            }
        }
        parts
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
