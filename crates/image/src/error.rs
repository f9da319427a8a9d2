//! Error types for the image crate.

use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur during image operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Unknown image format
    #[error("Unknown image format")]
    UnknownFormat,

    /// Recognised format that uploads do not accept
    #[error("{0} images cannot be uploaded")]
    UnsupportedUpload(&'static str),

    /// File larger than the upload limit
    #[error("Image is {size} bytes, limit is {limit} bytes")]
    TooLarge {
        /// Actual size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Crop viewport or framing that cannot map onto the output
    #[error("Invalid crop framing: {0}")]
    InvalidFraming(String),

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image decoding or encoding error
    #[cfg(feature = "processing")]
    #[error("Image processing error: {0}")]
    ProcessingError(#[from] image::ImageError),
}
