//! Prompt content parts.
//!
//! A prompt handed to the model is an ordered list of parts: text blocks and
//! inline images. Image bytes are base64-encoded once, when the part is
//! built, so the same knowledge image can be cloned into every prompt cheaply.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Inline image data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    /// MIME type (e.g. `image/png`).
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl ImageData {
    /// Encode raw bytes.
    #[must_use]
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Approximate decoded size in bytes.
    #[must_use]
    pub fn decoded_len(&self) -> usize {
        self.data.len() / 4 * 3
    }
}

/// One part of a prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// An inline image.
    Image {
        /// The image.
        #[serde(flatten)]
        image: ImageData,
    },
}

impl ContentPart {
    /// Convenience constructor for a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Convenience constructor for an image part.
    #[must_use]
    pub fn image(image: ImageData) -> Self {
        Self::Image { image }
    }

    /// The text, if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Image { .. } => None,
        }
    }

    /// Whether this is an image part.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_from_bytes_encodes_base64() {
        let img = ImageData::from_bytes("image/png", b"abc");
        assert_eq!(img.mime_type, "image/png");
        assert_eq!(img.data, "YWJj");
        assert_eq!(img.decoded_len(), 3);
    }

    #[test]
    fn text_part_accessors() {
        let part = ContentPart::text("hello");
        assert_eq!(part.as_text(), Some("hello"));
        assert!(!part.is_image());
    }

    #[test]
    fn image_part_accessors() {
        let part = ContentPart::image(ImageData::from_bytes("image/jpeg", b"x"));
        assert!(part.is_image());
        assert!(part.as_text().is_none());
    }

    #[test]
    fn image_part_serializes_flat() {
        let part = ContentPart::image(ImageData::from_bytes("image/webp", b"hi"));
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["mimeType"], "image/webp");
        assert_eq!(json["data"], "aGk=");
    }
}
