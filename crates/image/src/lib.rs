//! Image utilities for the Gigmap client.
//!
//! This crate provides:
//! - Pan/zoom state for the circular profile-photo crop guide
//! - The canvas transform mapping that framing onto a fixed square output
//! - Rendering and JPEG encoding of the cropped photo
//! - Format detection and size checks run before any upload

#![warn(missing_docs)]

mod cropper;
mod detect;
mod error;
mod transform;

#[cfg(feature = "processing")]
mod render;

pub use cropper::{single_touch, CropState, Point, MAX_SCALE, MIN_SCALE, WHEEL_SENSITIVITY};
pub use detect::{detect_format, validate_upload, ImageFormat};
pub use error::{ImageError, Result};
pub use transform::CropTransform;

#[cfg(feature = "processing")]
pub use render::{CroppedImage, Cropper, CropperOptions};
