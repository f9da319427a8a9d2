//! Image format detection from magic bytes.
//!
//! Uploads are checked here before any network call so an oversized or
//! non-image file is reported inline instead of failing at the backend.

use crate::{ImageError, Result};

/// Recognised image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// WebP image
    WebP,
    /// BMP image
    Bmp,
    /// HEIC/HEIF image
    Heic,
}

impl ImageFormat {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Heic => "image/heic",
        }
    }

    /// Preferred file extension, used when naming uploaded objects.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Heic => "heic",
        }
    }

    /// Whether listing and profile uploads accept this format.
    pub fn is_uploadable(&self) -> bool {
        matches!(self, ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP | ImageFormat::Gif)
    }
}

/// Detect image format from magic bytes.
///
/// # Example
/// ```
/// use gigmap_image::{detect_format, ImageFormat};
///
/// let jpeg_data = [0xFF, 0xD8, 0xFF, 0xE0];
/// assert_eq!(detect_format(&jpeg_data).unwrap(), ImageFormat::Jpeg);
/// ```
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 4 {
        return Err(ImageError::InvalidData("Not enough data for format detection".into()));
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(ImageFormat::Png);
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Ok(ImageFormat::Gif);
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Ok(ImageFormat::WebP);
    }

    if data.starts_with(b"BM") {
        return Ok(ImageFormat::Bmp);
    }

    // HEIC: ....ftypheic / heix / mif1 (phone camera default)
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        let brand = &data[8..12];
        if brand == b"heic" || brand == b"heix" || brand == b"mif1" {
            return Ok(ImageFormat::Heic);
        }
    }

    Err(ImageError::UnknownFormat)
}

/// Check an upload's size and format before sending it anywhere.
///
/// The size check runs first so an oversized file is reported as such even
/// when its format is also unsupported.
pub fn validate_upload(data: &[u8], max_bytes: usize) -> Result<ImageFormat> {
    if data.len() > max_bytes {
        return Err(ImageError::TooLarge {
            size: data.len(),
            limit: max_bytes,
        });
    }

    let format = detect_format(data)?;
    if !format.is_uploadable() {
        return Err(ImageError::UnsupportedUpload(format.mime_type()));
    }
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG: [u8; 10] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(detect_format(&JPEG).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_png() {
        let data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];
        assert_eq!(detect_format(&data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_webp() {
        let data = b"RIFF\x00\x00\x00\x00WEBP";
        assert_eq!(detect_format(data).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_detect_heic() {
        let data = b"\x00\x00\x00\x18ftypheic";
        assert_eq!(detect_format(data).unwrap(), ImageFormat::Heic);
    }

    #[test]
    fn test_unknown_format() {
        assert!(matches!(detect_format(&[0, 0, 0, 0]), Err(ImageError::UnknownFormat)));
    }

    #[test]
    fn test_validate_upload_accepts_jpeg() {
        assert_eq!(validate_upload(&JPEG, 1024).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_validate_upload_too_large() {
        let err = validate_upload(&JPEG, 4).unwrap_err();
        assert!(matches!(err, ImageError::TooLarge { size: 10, limit: 4 }));
    }

    #[test]
    fn test_validate_upload_rejects_heic() {
        let data = b"\x00\x00\x00\x18ftypheic";
        assert!(matches!(validate_upload(data, 1024), Err(ImageError::UnsupportedUpload("image/heic"))));
    }
}
