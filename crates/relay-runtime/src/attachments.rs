//! Chat message attachments and how their bytes are fetched.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

/// Largest attachment the HTTP fetcher will download.
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 25 * 1024 * 1024;

/// An attachment on an inbound chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Original file name.
    pub filename: String,
    /// Download URL.
    pub url: String,
    /// Declared MIME type, if the platform provided one.
    pub content_type: Option<String>,
    /// Declared size in bytes.
    pub size: u64,
}

impl Attachment {
    /// Whether the declared content type is an image type.
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

/// Fetching an attachment failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),
    /// The attachment exceeds the size limit.
    #[error("attachment is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Declared or actual size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },
}

/// Downloads attachment bytes.
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    /// Fetch the whole attachment.
    async fn fetch(&self, attachment: &Attachment) -> Result<Bytes, FetchError>;
}

/// [`AttachmentFetcher`] over plain HTTPS.
#[derive(Clone, Debug)]
pub struct HttpAttachmentFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpAttachmentFetcher {
    /// Fetcher with a fresh client and the default size limit.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Fetcher sharing an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            max_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }

    /// Override the size limit.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl Default for HttpAttachmentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttachmentFetcher for HttpAttachmentFetcher {
    async fn fetch(&self, attachment: &Attachment) -> Result<Bytes, FetchError> {
        if attachment.size > self.max_bytes {
            return Err(FetchError::TooLarge {
                size: attachment.size,
                limit: self.max_bytes,
            });
        }

        let response = self.client.get(&attachment.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let len = bytes.len() as u64;
        if len > self.max_bytes {
            return Err(FetchError::TooLarge {
                size: len,
                limit: self.max_bytes,
            });
        }
        debug!(file = %attachment.filename, bytes = len, "attachment fetched");
        Ok(bytes)
    }
}
