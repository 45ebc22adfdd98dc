//! # relay-runtime
//!
//! Everything between an inbound chat message and a broadcast reply.
//!
//! - [`KnowledgeStore`]: reference files injected into every prompt
//! - [`SessionRegistry`]: guild → chat session
//! - [`ResponseDecoder`]: raw model text → [`ReplyPayload`](relay_core::ReplyPayload)
//! - [`MessagePipeline`]: the serialized per-message workflow
//! - [`AdminCommands`]: set channel, new conversation, reload knowledge
//!
//! The pipeline talks to the outside world through three narrow traits:
//! [`DisplaySink`] (live display connections), [`ChatChannel`] (the
//! originating chat channel), and [`AttachmentFetcher`].

#![deny(unsafe_code)]

pub mod attachments;
pub mod channel;
pub mod commands;
pub mod decode;
pub mod display;
pub mod images;
pub mod knowledge;
pub mod pipeline;
pub mod prompt;
pub mod sessions;

pub use attachments::{Attachment, AttachmentFetcher, FetchError, HttpAttachmentFetcher};
pub use channel::{ChannelError, ChatChannel, TypingIndicator};
pub use commands::{AdminCommands, CommandError};
pub use decode::ResponseDecoder;
pub use display::DisplaySink;
pub use knowledge::{KnowledgeEntry, KnowledgeSnapshot, KnowledgeStore};
pub use pipeline::{Author, InboundMessage, MessagePipeline, Outcome, SkipReason};
pub use sessions::SessionRegistry;
