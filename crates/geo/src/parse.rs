//! Lenient degree parsing.
//!
//! Profile and listing documents store coordinates as numbers or as the
//! strings typed into the location form, so every distance entry point
//! accepts either.

/// A value that may hold a coordinate in decimal degrees.
pub trait ParseDegrees {
    /// Returns the value as finite degrees, or `None` if it is not a number.
    fn parse_degrees(&self) -> Option<f64>;
}

#[inline]
fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

impl ParseDegrees for f64 {
    fn parse_degrees(&self) -> Option<f64> {
        finite(*self)
    }
}

impl ParseDegrees for f32 {
    fn parse_degrees(&self) -> Option<f64> {
        finite(f64::from(*self))
    }
}

impl ParseDegrees for i32 {
    fn parse_degrees(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl ParseDegrees for i64 {
    #[allow(clippy::cast_precision_loss)]
    fn parse_degrees(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl ParseDegrees for str {
    fn parse_degrees(&self) -> Option<f64> {
        self.trim().parse::<f64>().ok().and_then(finite)
    }
}

impl ParseDegrees for String {
    fn parse_degrees(&self) -> Option<f64> {
        self.as_str().parse_degrees()
    }
}

impl ParseDegrees for serde_json::Value {
    fn parse_degrees(&self) -> Option<f64> {
        match self {
            serde_json::Value::Number(n) => n.as_f64().and_then(finite),
            serde_json::Value::String(s) => s.parse_degrees(),
            _ => None,
        }
    }
}

impl<T: ParseDegrees> ParseDegrees for Option<T> {
    fn parse_degrees(&self) -> Option<f64> {
        self.as_ref().and_then(ParseDegrees::parse_degrees)
    }
}

impl<T: ParseDegrees + ?Sized> ParseDegrees for &T {
    fn parse_degrees(&self) -> Option<f64> {
        (**self).parse_degrees()
    }
}
