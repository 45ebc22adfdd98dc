//! Gemini `generateContent` client.

pub mod client;
pub mod converter;
pub mod types;

pub use client::GeminiModel;
pub use types::GeminiConfig;
