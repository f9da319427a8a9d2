//! Geospatial utilities for Gigmap listings.
//!
//! This crate provides:
//! - Haversine distance between a viewer and a listing
//! - The "distance away" display rule
//! - Lenient coordinate parsing for stored documents (numbers or strings)
//! - Nearest-first sorting with optional parallelism
//! - Normalization of LocationIQ and OpenCage geocoder responses
//! - WASM bindings for browser usage
//!
//! # Example
//!
//! ```
//! use gigmap_geo::{distance_km, format_distance};
//!
//! // Bangalore to Chennai
//! let km = distance_km(12.9716, 77.5946, "13.0827", "80.2707").unwrap();
//! assert!(km > 290.0 && km < 295.0);
//! assert!(format_distance(Some(km)).ends_with(" km"));
//!
//! assert_eq!(distance_km("abc", 1, 2, 3), None);
//! assert_eq!(format_distance(None), "--");
//! ```

mod display;
mod error;
mod haversine;
mod parse;
pub mod batch;
pub mod geocode;

#[cfg(feature = "wasm")]
mod wasm;

pub use batch::{calculate_distances, sort_by_distance, DistanceResult, LocationItem};
pub use display::format_distance;
pub use error::{GeoError, GeoErrorCode, Result};
pub use geocode::{GeocodeProvider, Place};
pub use haversine::{distance_km, haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM, EARTH_RADIUS_M};
pub use parse::ParseDegrees;

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Builds a coordinate from loosely typed document fields.
    ///
    /// Returns `None` if either value does not parse to a finite number.
    pub fn parse(latitude: impl ParseDegrees, longitude: impl ParseDegrees) -> Option<Self> {
        Some(Self::new(latitude.parse_degrees()?, longitude.parse_degrees()?))
    }

    /// Like [`Coordinate::parse`] but rejects out-of-range values.
    pub fn parse_strict(latitude: impl ParseDegrees, longitude: impl ParseDegrees) -> Result<Self> {
        let coord = Self::parse(latitude, longitude)
            .ok_or_else(|| GeoError::InvalidCoordinate("not a finite number".to_string()))?;
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({}, {}) is out of range",
                coord.latitude, coord.longitude
            )))
        }
    }

    /// Returns true if the coordinate has valid values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(0.0, 0.0).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
    }

    #[test]
    fn test_coordinate_parse_mixed_inputs() {
        let coord = Coordinate::parse("12.9716", 77.5946).unwrap();
        assert_eq!(coord.latitude, 12.9716);
        assert!(Coordinate::parse("", 77.5946).is_none());
    }

    #[test]
    fn test_coordinate_parse_strict_range() {
        let err = Coordinate::parse_strict(95.0, 10.0).unwrap_err();
        assert_eq!(err.code(), GeoErrorCode::InvalidCoordinate);
    }

    #[test]
    fn test_coordinate_from_tuple() {
        let coord: Coordinate = (13.0827, 80.2707).into();
        assert_eq!(coord.longitude, 80.2707);
    }
}
