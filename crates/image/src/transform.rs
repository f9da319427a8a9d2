//! Canvas transform from the on-screen framing to the square output.
//!
//! The draw is composed in a fixed order:
//! 1. move the origin to the output center
//! 2. apply the user's zoom
//! 3. apply the user's pan, scaled from UI pixels to output pixels
//! 4. apply the cover scale so the image fills the square
//! 5. draw the image centered on the origin
//!
//! Zoom therefore pivots on the guide's center and also scales the pan,
//! exactly as the preview does. Reordering moves the zoom pivot.

use crate::cropper::{CropState, Point};

/// Affine mapping between source image pixels and output pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropTransform {
    output_size: f64,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    cover: f64,
    half_w: f64,
    half_h: f64,
}

impl CropTransform {
    /// Build the transform for a framing.
    ///
    /// `ui_size` is the side of the on-screen viewport square; `natural_*`
    /// are the source image's pixel dimensions.
    pub fn new(state: &CropState, ui_size: f64, natural_width: u32, natural_height: u32, output_size: u32) -> Self {
        let output = f64::from(output_size);
        let ratio = output / ui_size;
        let w = f64::from(natural_width);
        let h = f64::from(natural_height);

        Self {
            output_size: output,
            zoom: state.scale,
            pan_x: state.offset.x * ratio,
            pan_y: state.offset.y * ratio,
            cover: (output / w).max(output / h),
            half_w: w / 2.0,
            half_h: h / 2.0,
        }
    }

    /// Cover scale applied before drawing.
    pub fn cover_scale(&self) -> f64 {
        self.cover
    }

    /// Where a source pixel lands in the output.
    pub fn source_to_output(&self, src: Point) -> Point {
        let center = self.output_size / 2.0;
        Point::new(
            center + self.zoom * (self.pan_x + self.cover * (src.x - self.half_w)),
            center + self.zoom * (self.pan_y + self.cover * (src.y - self.half_h)),
        )
    }

    /// Which source position an output pixel samples.
    pub fn output_to_source(&self, dest: Point) -> Point {
        let center = self.output_size / 2.0;
        Point::new(
            ((dest.x - center) / self.zoom - self.pan_x) / self.cover + self.half_w,
            ((dest.y - center) / self.zoom - self.pan_y) / self.cover + self.half_h,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_square_image_fills_output() {
        let t = CropTransform::new(&CropState::new(), 250.0, 1000, 1000, 500);
        assert_eq!(t.cover_scale(), 0.5);
        assert!(close(t.source_to_output(Point::new(0.0, 0.0)), Point::new(0.0, 0.0)));
        assert!(close(t.source_to_output(Point::new(1000.0, 1000.0)), Point::new(500.0, 500.0)));
    }

    #[test]
    fn test_cover_uses_the_short_side() {
        // Landscape: height decides, width overflows
        let t = CropTransform::new(&CropState::new(), 250.0, 2000, 1000, 500);
        assert_eq!(t.cover_scale(), 0.5);
        let left = t.source_to_output(Point::new(0.0, 500.0));
        assert!(close(left, Point::new(-250.0, 250.0)));
    }

    #[test]
    fn test_zoom_pivots_on_center() {
        let state = CropState::with_view(Point::default(), 2.0);
        let t = CropTransform::new(&state, 250.0, 1000, 1000, 500);
        assert!(close(t.source_to_output(Point::new(500.0, 500.0)), Point::new(250.0, 250.0)));
        assert!(close(t.source_to_output(Point::new(250.0, 250.0)), Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_pan_is_scaled_to_output_then_zoomed() {
        // 10 UI px at a 250 px viewport is 20 output px, doubled by the zoom
        let state = CropState::with_view(Point::new(10.0, 0.0), 2.0);
        let t = CropTransform::new(&state, 250.0, 1000, 1000, 500);
        assert!(close(t.source_to_output(Point::new(500.0, 500.0)), Point::new(290.0, 250.0)));
    }

    #[test]
    fn test_inverse_round_trips() {
        let state = CropState::with_view(Point::new(-17.0, 33.0), 1.7);
        let t = CropTransform::new(&state, 300.0, 640, 480, 500);
        let src = Point::new(123.0, 456.0);
        assert!(close(t.output_to_source(t.source_to_output(src)), src));
    }
}
