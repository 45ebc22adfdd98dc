//! Image validation for knowledge files and chat attachments.

use image::ImageError;
use relay_core::ImageData;

/// Validate encoded image bytes and wrap them as inline image data.
///
/// The format is sniffed from the bytes, not the file name; the image is
/// fully decoded once so corrupt files are rejected up front.
pub fn to_image_data(bytes: &[u8]) -> Result<ImageData, ImageError> {
    let format = image::guess_format(bytes)?;
    let _ = image::load_from_memory_with_format(bytes, format)?;
    Ok(ImageData::from_bytes(format.to_mime_type(), bytes))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, RgbImage};

    /// A tiny valid PNG.
    pub fn png_bytes() -> Vec<u8> {
        encode(ImageFormat::Png)
    }

    /// A tiny valid JPEG.
    pub fn jpeg_bytes() -> Vec<u8> {
        encode(ImageFormat::Jpeg)
    }

    fn encode(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{jpeg_bytes, png_bytes};
    use super::*;

    #[test]
    fn png_is_recognised() {
        let data = to_image_data(&png_bytes()).unwrap();
        assert_eq!(data.mime_type, "image/png");
        assert!(!data.data.is_empty());
    }

    #[test]
    fn jpeg_is_recognised() {
        let data = to_image_data(&jpeg_bytes()).unwrap();
        assert_eq!(data.mime_type, "image/jpeg");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(to_image_data(b"definitely not an image").is_err());
    }

    #[test]
    fn truncated_png_is_rejected() {
        let bytes = png_bytes();
        assert!(to_image_data(&bytes[..bytes.len() / 2]).is_err());
    }
}
