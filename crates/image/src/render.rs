//! Rendering and encoding of the cropped profile photo.

use crate::{CropState, CropTransform, ImageError, Point, Result};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// Options for the cropped output.
#[derive(Debug, Clone)]
pub struct CropperOptions {
    /// Side of the square output in pixels
    pub output_size: u32,
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Side of the on-screen viewport square in UI pixels
    pub ui_size: f64,
}

impl Default for CropperOptions {
    fn default() -> Self {
        Self {
            output_size: 500,
            quality: 95,
            ui_size: 250.0,
        }
    }
}

/// Encoded result of a crop, ready for upload.
#[derive(Debug, Clone)]
pub struct CroppedImage {
    /// JPEG bytes
    pub data: Vec<u8>,
    /// Output width and height (always square)
    pub size: u32,
}

impl CroppedImage {
    /// MIME type of [`CroppedImage::data`].
    pub fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }
}

/// Holds the loaded source photo and produces crops from a framing.
#[derive(Debug, Default)]
pub struct Cropper {
    source: Option<RgbaImage>,
    options: CropperOptions,
}

impl Cropper {
    /// Create a cropper with no image loaded.
    pub fn new(options: CropperOptions) -> Self {
        Self { source: None, options }
    }

    /// Decode the source photo.
    ///
    /// On failure the previous source is dropped, so a later crop is a no-op
    /// rather than a crop of a stale image.
    pub fn load(&mut self, data: &[u8]) -> Result<(u32, u32)> {
        self.source = None;
        let img = image::load_from_memory(data).map_err(|e| {
            debug!(error = %e, "source image failed to load");
            ImageError::from(e)
        })?;
        let rgba = img.to_rgba8();
        let dims = rgba.dimensions();
        self.source = Some(rgba);
        Ok(dims)
    }

    /// Use an already decoded image as the source.
    pub fn load_image(&mut self, img: &DynamicImage) {
        self.source = Some(img.to_rgba8());
    }

    /// Natural pixel dimensions of the loaded source.
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        self.source.as_ref().map(RgbaImage::dimensions)
    }

    /// Crop options in use.
    pub fn options(&self) -> &CropperOptions {
        &self.options
    }

    /// Check that the viewport and framing give a finite transform.
    pub fn check_framing(&self, state: &CropState) -> Result<()> {
        let ui_size = self.options.ui_size;
        if !(ui_size.is_finite() && ui_size > 0.0) {
            return Err(ImageError::InvalidFraming(format!("viewport size {ui_size} must be positive")));
        }
        if !(state.offset.x.is_finite() && state.offset.y.is_finite()) {
            return Err(ImageError::InvalidFraming(format!(
                "pan offset ({}, {}) must be finite",
                state.offset.x, state.offset.y
            )));
        }
        Ok(())
    }

    /// Render the framing to raw pixels.
    ///
    /// `None` if no source is loaded or the framing fails
    /// [`Cropper::check_framing`].
    pub fn render(&self, state: &CropState) -> Option<RgbImage> {
        let source = self.source.as_ref()?;
        let (w, h) = source.dimensions();
        if w == 0 || h == 0 || self.check_framing(state).is_err() {
            return None;
        }

        let size = self.options.output_size;
        let transform = CropTransform::new(state, self.options.ui_size, w, h, size);

        let mut out = RgbImage::new(size, size);
        for (x, y, pixel) in out.enumerate_pixels_mut() {
            let dest = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            *pixel = sample_bilinear(source, transform.output_to_source(dest));
        }
        Some(out)
    }

    /// Render and encode the framing as JPEG.
    ///
    /// Returns `Ok(None)` when no source image is loaded and an error for a
    /// degenerate framing; nothing partial is ever produced.
    pub fn crop(&self, state: &CropState) -> Result<Option<CroppedImage>> {
        if self.source.is_some() {
            self.check_framing(state)?;
        }
        let Some(pixels) = self.render(state) else {
            return Ok(None);
        };

        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(pixels)
            .write_to(&mut buffer, ImageOutputFormat::Jpeg(self.options.quality))?;

        Ok(Some(CroppedImage {
            data: buffer.into_inner(),
            size: self.options.output_size,
        }))
    }
}

/// Sample the source at a position in pixel space, compositing over black.
///
/// Areas outside the source stay black, matching an unfilled canvas
/// encoded without alpha.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_bilinear(src: &RgbaImage, at: Point) -> Rgb<u8> {
    let (w, h) = src.dimensions();
    if at.x < 0.0 || at.y < 0.0 || at.x >= f64::from(w) || at.y >= f64::from(h) {
        return Rgb([0, 0, 0]);
    }

    // Pixel centers sit at +0.5
    let fx = (at.x - 0.5).max(0.0);
    let fy = (at.y - 0.5).max(0.0);
    let x0 = (fx.floor() as u32).min(w - 1);
    let y0 = (fy.floor() as u32).min(h - 1);
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let tx = fx - f64::from(x0);
    let ty = fy - f64::from(y0);

    let corners = [
        (src.get_pixel(x0, y0), (1.0 - tx) * (1.0 - ty)),
        (src.get_pixel(x1, y0), tx * (1.0 - ty)),
        (src.get_pixel(x0, y1), (1.0 - tx) * ty),
        (src.get_pixel(x1, y1), tx * ty),
    ];

    let mut rgb = [0.0f64; 3];
    for (pixel, weight) in corners {
        let alpha = f64::from(pixel[3]) / 255.0;
        for (channel, value) in rgb.iter_mut().enumerate() {
            *value += f64::from(pixel[channel]) * alpha * weight;
        }
    }

    Rgb(rgb.map(|v| v.round().clamp(0.0, 255.0) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let buf = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 128, 255])
        });
        DynamicImage::ImageRgba8(buf)
    }

    fn encoded(img: &DynamicImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageOutputFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_crop_without_source_is_noop() {
        let cropper = Cropper::new(CropperOptions::default());
        assert!(cropper.crop(&CropState::new()).unwrap().is_none());
    }

    #[test]
    fn test_degenerate_viewport_is_rejected() {
        let red = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        for ui_size in [0.0, -250.0, f64::NAN, f64::INFINITY] {
            let mut cropper = Cropper::new(CropperOptions {
                output_size: 20,
                ui_size,
                ..CropperOptions::default()
            });
            cropper.load_image(&red);

            assert!(cropper.render(&CropState::new()).is_none(), "ui_size {ui_size}");
            let err = cropper.crop(&CropState::new()).unwrap_err();
            assert!(matches!(err, ImageError::InvalidFraming(_)), "ui_size {ui_size}");
        }
    }

    #[test]
    fn test_non_finite_pan_is_rejected() {
        let mut cropper = Cropper::new(CropperOptions { output_size: 20, ..CropperOptions::default() });
        cropper.load_image(&gradient(10, 10));
        let state = CropState::with_view(Point::new(f64::NAN, 0.0), 1.0);
        assert!(matches!(cropper.crop(&state), Err(ImageError::InvalidFraming(_))));
    }

    #[test]
    fn test_failed_load_clears_previous_source() {
        let mut cropper = Cropper::new(CropperOptions::default());
        cropper.load_image(&gradient(40, 30));
        assert!(cropper.load(b"definitely not an image").is_err());
        assert!(cropper.natural_size().is_none());
        assert!(cropper.crop(&CropState::new()).unwrap().is_none());
    }

    #[test]
    fn test_output_is_fixed_square_jpeg() {
        let mut cropper = Cropper::new(CropperOptions::default());
        assert_eq!(cropper.load(&encoded(&gradient(320, 200))).unwrap(), (320, 200));

        let cropped = cropper.crop(&CropState::new()).unwrap().unwrap();
        assert_eq!(cropped.size, 500);
        assert_eq!(crate::detect_format(&cropped.data).unwrap(), crate::ImageFormat::Jpeg);

        let decoded = image::load_from_memory(&cropped.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (500, 500));
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut cropper = Cropper::new(CropperOptions { output_size: 64, ..CropperOptions::default() });
        cropper.load_image(&gradient(90, 60));
        let state = CropState::with_view(Point::new(12.0, -7.0), 1.3);

        let first = cropper.render(&state).unwrap();
        let second = cropper.render(&state).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());

        let a = cropper.crop(&state).unwrap().unwrap();
        let b = cropper.crop(&state).unwrap().unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn test_zoomed_out_leaves_black_border() {
        let mut cropper = Cropper::new(CropperOptions { output_size: 50, ..CropperOptions::default() });
        cropper.load_image(&DynamicImage::ImageRgba8(ImageBuffer::from_pixel(10, 10, Rgba([255, 255, 255, 255]))));

        let pixels = cropper.render(&CropState::with_view(Point::default(), 0.5)).unwrap();
        assert_eq!(*pixels.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*pixels.get_pixel(25, 25), Rgb([255, 255, 255]));
    }
}
