//! # relay-settings
//!
//! Configuration management with layered sources for the persona relay.
//!
//! Settings are loaded from four layers (in priority order, lowest first):
//! 1. **Compiled defaults**: [`RelaySettings::default()`]
//! 2. **Settings file**: optional JSON file, deep-merged over defaults
//! 3. **Env file**: `ENV_FILE_PATH` (default `.env`) loaded into the process
//!    environment; variables already set win
//! 4. **Environment variables**: overrides such as `PORT`, `GEMINI_MODEL`
//!
//! The one value that changes at runtime, the active chat channel, lives
//! behind [`ActiveChannelStore`] rather than in [`RelaySettings`].

#![deny(unsafe_code)]

pub mod active_channel;
pub mod errors;
pub mod loader;
pub mod persona;
pub mod types;

pub use active_channel::{ActiveChannelStore, EnvFileChannelStore, MemoryChannelStore};
pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, deep_merge, load_env_file, load_settings, load_settings_from_path};
pub use persona::load_persona;
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
