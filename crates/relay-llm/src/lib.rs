//! # relay-llm
//!
//! Chat model abstraction for the persona relay.
//!
//! - [`ChatModel`]: send one user turn against a [`ChatSession`](relay_core::ChatSession)
//!   and get the model's raw text back
//! - [`gemini`]: the Gemini `generateContent` client (API key auth)
//! - [`mock`]: scripted model for deterministic tests

#![deny(unsafe_code)]

pub mod gemini;
pub mod mock;
pub mod provider;

pub use gemini::{GeminiConfig, GeminiModel};
pub use provider::{ChatModel, ProviderError, ProviderResult};
