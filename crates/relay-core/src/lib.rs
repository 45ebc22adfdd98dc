//! # relay-core
//!
//! Foundation types shared by every relay crate.
//!
//! - Branded ids: [`GuildId`], [`ChannelId`], [`ConnectionId`]
//! - Prompt content parts ([`ContentPart`], [`ImageData`])
//! - Per-guild conversational state ([`ChatSession`], [`Turn`])
//! - The broadcast payload and emotion → sprite table ([`ReplyPayload`], [`SpriteMap`])

#![deny(unsafe_code)]

pub mod content;
pub mod ids;
pub mod reply;
pub mod session;

pub use content::{ContentPart, ImageData};
pub use ids::{ChannelId, ConnectionId, GuildId};
pub use reply::{NEUTRAL_EMOTION, ReplyPayload, SpriteMap};
pub use session::{ChatSession, Role, Turn};
