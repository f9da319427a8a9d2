//! Pan and zoom state behind the circular crop guide.
//!
//! Mouse and single-finger touch share one translation model: the offset
//! follows the pointer relative to where the drag started.

/// Smallest allowed zoom
pub const MIN_SCALE: f64 = 0.5;

/// Largest allowed zoom
pub const MAX_SCALE: f64 = 3.0;

/// Zoom change per wheel delta unit
pub const WHEEL_SENSITIVITY: f64 = 0.01;

/// A position in UI pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The pointer position for a touch event, if exactly one finger is down.
///
/// Pinch and multi-finger gestures are not part of the drag model.
pub fn single_touch(touches: &[Point]) -> Option<Point> {
    match touches {
        [only] => Some(*only),
        _ => None,
    }
}

/// What the user has framed inside the crop guide.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropState {
    /// Pan offset in UI pixels
    pub offset: Point,
    /// Zoom, always within [`MIN_SCALE`, `MAX_SCALE`]
    pub scale: f64,
    #[serde(skip)]
    drag_anchor: Option<Point>,
}

impl Default for CropState {
    fn default() -> Self {
        Self {
            offset: Point::default(),
            scale: 1.0,
            drag_anchor: None,
        }
    }
}

impl CropState {
    /// Start centered at 1x zoom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from explicit values, clamping the zoom.
    pub fn with_view(offset: Point, scale: f64) -> Self {
        Self {
            offset,
            scale: clamp_scale(scale),
            drag_anchor: None,
        }
    }

    /// Apply a mouse-wheel delta. Positive deltas (scrolling down) zoom out.
    pub fn zoom_by_wheel(&mut self, delta: f64) {
        self.set_scale(self.scale - delta * WHEEL_SENSITIVITY);
    }

    /// Set the zoom directly (slider input), clamped to the allowed range.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = clamp_scale(scale);
    }

    /// Begin a drag at the given pointer position.
    pub fn begin_drag(&mut self, pointer: Point) {
        self.drag_anchor = Some(Point::new(pointer.x - self.offset.x, pointer.y - self.offset.y));
    }

    /// Move the image with the pointer. Ignored when no drag is active.
    pub fn drag_to(&mut self, pointer: Point) {
        if let Some(anchor) = self.drag_anchor {
            self.offset = Point::new(pointer.x - anchor.x, pointer.y - anchor.y);
        }
    }

    /// Finish the current drag.
    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Return to the initial framing.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_zoom_is_scaled_and_clamped() {
        let mut state = CropState::new();
        state.zoom_by_wheel(-50.0);
        assert!((state.scale - 1.5).abs() < 1e-12);

        state.zoom_by_wheel(-1000.0);
        assert_eq!(state.scale, MAX_SCALE);

        state.zoom_by_wheel(1000.0);
        assert_eq!(state.scale, MIN_SCALE);
    }

    #[test]
    fn test_drag_follows_pointer_delta() {
        let mut state = CropState::new();
        state.begin_drag(Point::new(100.0, 100.0));
        state.drag_to(Point::new(130.0, 90.0));
        assert_eq!(state.offset, Point::new(30.0, -10.0));
        state.end_drag();

        // A second drag continues from the current offset
        state.begin_drag(Point::new(0.0, 0.0));
        state.drag_to(Point::new(5.0, 5.0));
        assert_eq!(state.offset, Point::new(35.0, -5.0));
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let mut state = CropState::new();
        state.drag_to(Point::new(40.0, 40.0));
        assert_eq!(state.offset, Point::default());
        assert!(!state.is_dragging());
    }

    #[test]
    fn test_touch_uses_same_model_as_mouse() {
        let mut mouse = CropState::new();
        let mut touch = CropState::new();

        mouse.begin_drag(Point::new(10.0, 10.0));
        mouse.drag_to(Point::new(20.0, 35.0));

        touch.begin_drag(single_touch(&[Point::new(10.0, 10.0)]).unwrap());
        touch.drag_to(single_touch(&[Point::new(20.0, 35.0)]).unwrap());

        assert_eq!(mouse.offset, touch.offset);
    }

    #[test]
    fn test_multi_touch_is_not_a_drag() {
        assert!(single_touch(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).is_none());
        assert!(single_touch(&[]).is_none());
    }

    #[test]
    fn test_with_view_clamps() {
        assert_eq!(CropState::with_view(Point::default(), 10.0).scale, MAX_SCALE);
        assert_eq!(CropState::with_view(Point::default(), f64::NAN).scale, 1.0);
    }
}
