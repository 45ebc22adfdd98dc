//! The runtime-mutable active chat channel.
//!
//! Every message pipeline invocation reads the active channel through
//! [`ActiveChannelStore::get`], so a change made by the administrative
//! command applies to the very next message.
//!
//! [`EnvFileChannelStore`] persists the value as a `CHANNEL_ID=<id>` line of
//! the key-value env file so it survives restarts.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use relay_core::ChannelId;
use tracing::info;

use crate::errors::Result;

/// Env key holding the active channel id.
pub const CHANNEL_ID_KEY: &str = "CHANNEL_ID";

/// Read/write access to the active channel.
pub trait ActiveChannelStore: Send + Sync {
    /// Current active channel ([`ChannelId::NONE`] when unset).
    fn get(&self) -> ChannelId;

    /// Replace the active channel and persist it.
    fn set(&self, channel: ChannelId) -> Result<()>;
}

/// Active channel persisted to a `KEY=value` env file.
#[derive(Debug)]
pub struct EnvFileChannelStore {
    path: PathBuf,
    current: AtomicU64,
}

impl EnvFileChannelStore {
    /// Create a store with a known initial value.
    pub fn new(path: impl Into<PathBuf>, initial: ChannelId) -> Self {
        Self {
            path: path.into(),
            current: AtomicU64::new(initial.get()),
        }
    }

    /// Create a store initialised from the `CHANNEL_ID` environment variable.
    ///
    /// An absent or non-numeric value means no active channel.
    pub fn from_env(path: impl Into<PathBuf>) -> Self {
        let initial = std::env::var(CHANNEL_ID_KEY)
            .ok()
            .and_then(|raw| ChannelId::parse(&raw))
            .unwrap_or(ChannelId::NONE);
        Self::new(path, initial)
    }

    /// Env file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActiveChannelStore for EnvFileChannelStore {
    fn get(&self) -> ChannelId {
        ChannelId::new(self.current.load(Ordering::Acquire))
    }

    fn set(&self, channel: ChannelId) -> Result<()> {
        update_env_file(&self.path, CHANNEL_ID_KEY, &channel.to_string())?;
        self.current.store(channel.get(), Ordering::Release);
        info!(channel = %channel, path = %self.path.display(), "active channel updated");
        Ok(())
    }
}

/// In-memory active channel, for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryChannelStore {
    current: AtomicU64,
}

impl MemoryChannelStore {
    /// Create with an initial value.
    pub fn new(initial: ChannelId) -> Self {
        Self {
            current: AtomicU64::new(initial.get()),
        }
    }
}

impl ActiveChannelStore for MemoryChannelStore {
    fn get(&self) -> ChannelId {
        ChannelId::new(self.current.load(Ordering::Acquire))
    }

    fn set(&self, channel: ChannelId) -> Result<()> {
        self.current.store(channel.get(), Ordering::Release);
        Ok(())
    }
}

/// Set `key=value` in an env file, replacing an existing `key=` line or
/// appending one. The file and its parent directories are created if missing.
pub fn update_env_file(path: &Path, key: &str, value: &str) -> Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let prefix = format!("{key}=");
    let new_line = format!("{key}={value}");
    let mut replaced = false;
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            if line.trim().starts_with(&prefix) {
                replaced = true;
                new_line.clone()
            } else {
                line.to_string()
            }
        })
        .collect();
    if !replaced {
        lines.push(new_line);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_replaces_existing_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "DISCORD_BOT_TOKEN=abc\nCHANNEL_ID=1\nGEMINI_API_KEY=k\n").unwrap();

        update_env_file(&path, "CHANNEL_ID", "222").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "DISCORD_BOT_TOKEN=abc\nCHANNEL_ID=222\nGEMINI_API_KEY=k\n");
    }

    #[test]
    fn update_matches_indented_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "  CHANNEL_ID=1\n").unwrap();

        update_env_file(&path, "CHANNEL_ID", "5").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "CHANNEL_ID=5\n");
    }

    #[test]
    fn update_appends_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "A=1\n").unwrap();

        update_env_file(&path, "CHANNEL_ID", "9").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\nCHANNEL_ID=9\n");
    }

    #[test]
    fn update_does_not_touch_similar_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "OLD_CHANNEL_ID=1\n").unwrap();

        update_env_file(&path, "CHANNEL_ID", "2").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "OLD_CHANNEL_ID=1\nCHANNEL_ID=2\n"
        );
    }

    #[test]
    fn update_creates_file_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/conf/.env");

        update_env_file(&path, "CHANNEL_ID", "3").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "CHANNEL_ID=3\n");
    }

    #[test]
    fn env_file_store_persists_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let store = EnvFileChannelStore::new(&path, ChannelId::NONE);
        assert!(store.get().is_none());

        store.set(ChannelId::new(1234)).unwrap();
        assert_eq!(store.get(), ChannelId::new(1234));
        assert!(std::fs::read_to_string(&path).unwrap().contains("CHANNEL_ID=1234"));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryChannelStore::new(ChannelId::new(7));
        assert_eq!(store.get(), ChannelId::new(7));
        store.set(ChannelId::new(8)).unwrap();
        assert_eq!(store.get(), ChannelId::new(8));
    }
}
