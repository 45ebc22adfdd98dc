//! # relay-discord
//!
//! Discord side of the relay, on `serenity`.
//!
//! - [`RelayHandler`]: gateway events → [`MessagePipeline`](relay_runtime::MessagePipeline)
//!   and [`AdminCommands`](relay_runtime::AdminCommands)
//! - [`DiscordChannel`]: the pipeline's view of a Discord text channel
//! - [`commands`]: slash command definitions and option parsing
//! - [`DiscordBot`]: client construction and shutdown

#![deny(unsafe_code)]

pub mod bot;
pub mod channel;
pub mod commands;
pub mod convert;
pub mod handler;

pub use bot::DiscordBot;
pub use channel::DiscordChannel;
pub use handler::RelayHandler;
