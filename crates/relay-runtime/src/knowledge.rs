//! Knowledge store: reference files injected into every prompt.
//!
//! A reload scans one flat directory for text (`.txt`, `.md`) and image
//! (`.png`, `.jpg`, `.jpeg`, `.webp`) files, reads each fully, and swaps the
//! whole mapping in one step. Files that fail to read are logged and
//! skipped. Readers hold an [`Arc`] snapshot, so a reload never changes a
//! prompt that is already being assembled.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use relay_core::ImageData;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::images::to_image_data;

const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// One loaded knowledge file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KnowledgeEntry {
    /// UTF-8 text content.
    Text(String),
    /// Decoded, validated image.
    Image(ImageData),
}

/// Immutable file name → entry mapping, ordered by file name.
pub type KnowledgeSnapshot = Arc<BTreeMap<String, KnowledgeEntry>>;

/// Why a single knowledge file was skipped.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// Reading the file failed (including invalid UTF-8 in a text file).
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The image could not be decoded.
    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: image::ImageError,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FileKind {
    Text,
    Image,
}

fn classify(path: &Path) -> Option<FileKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Text)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Image)
    } else {
        None
    }
}

async fn load_entry(path: &Path, kind: FileKind) -> Result<KnowledgeEntry, KnowledgeError> {
    match kind {
        FileKind::Text => tokio::fs::read_to_string(path)
            .await
            .map(KnowledgeEntry::Text)
            .map_err(|source| KnowledgeError::Io {
                path: path.to_path_buf(),
                source,
            }),
        FileKind::Image => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|source| KnowledgeError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            to_image_data(&bytes)
                .map(KnowledgeEntry::Image)
                .map_err(|source| KnowledgeError::Image {
                    path: path.to_path_buf(),
                    source,
                })
        }
    }
}

/// In-memory knowledge files, rebuilt on demand.
#[derive(Debug)]
pub struct KnowledgeStore {
    dir: PathBuf,
    entries: RwLock<KnowledgeSnapshot>,
}

impl KnowledgeStore {
    /// Create an empty store over `dir`. Nothing is read until [`reload`](Self::reload).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            entries: RwLock::new(Arc::new(BTreeMap::new())),
        }
    }

    /// Directory scanned on reload.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rescan the directory and replace every entry. Returns the number of
    /// files loaded.
    ///
    /// A missing directory yields an empty store.
    pub async fn reload(&self) -> usize {
        let loaded = self.scan().await;
        let count = loaded.len();
        *self.entries.write() = Arc::new(loaded);
        info!(dir = %self.dir.display(), count, "knowledge base loaded");
        count
    }

    async fn scan(&self) -> BTreeMap<String, KnowledgeEntry> {
        let mut loaded = BTreeMap::new();

        let mut read_dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "knowledge directory not readable");
                return loaded;
            }
        };

        loop {
            let entry = match read_dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %self.dir.display(), error = %e, "knowledge directory scan aborted");
                    break;
                }
            };

            let path = entry.path();
            let Some(kind) = classify(&path) else {
                continue;
            };
            if !entry.file_type().await.is_ok_and(|t| t.is_file()) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
                continue;
            };

            match load_entry(&path, kind).await {
                Ok(value) => {
                    debug!(file = %name, ?kind, "knowledge file loaded");
                    let _ = loaded.insert(name, value);
                }
                Err(e) => warn!(file = %name, error = %e, "skipping knowledge file"),
            }
        }

        loaded
    }

    /// Current mapping.
    pub fn snapshot(&self) -> KnowledgeSnapshot {
        Arc::clone(&self.entries.read())
    }

    /// Number of loaded entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no entry is loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
