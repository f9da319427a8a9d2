//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::{Coordinate, ParseDegrees};

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance in kilometers between two loosely typed positions.
///
/// Each value may be a number, a numeric string or a JSON value. Returns
/// `None` if any of the four does not parse to a finite number; callers
/// render that as `"--"`.
///
/// # Example
/// ```
/// use gigmap_geo::distance_km;
///
/// assert_eq!(distance_km(12.9716, 77.5946, 12.9716, 77.5946), Some(0.0));
/// assert_eq!(distance_km("abc", 1, 2, 3), None);
/// ```
pub fn distance_km(
    lat1: impl ParseDegrees,
    lon1: impl ParseDegrees,
    lat2: impl ParseDegrees,
    lon2: impl ParseDegrees,
) -> Option<f64> {
    let from = Coordinate::parse(lat1, lon1)?;
    let to = Coordinate::parse(lat2, lon2)?;
    Some(haversine_distance(&from, &to))
}

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// # Example
/// ```
/// use gigmap_geo::{haversine_distance, Coordinate};
///
/// let bangalore = Coordinate::new(12.9716, 77.5946);
/// let chennai = Coordinate::new(13.0827, 80.2707);
///
/// let distance = haversine_distance(&bangalore, &chennai);
/// assert!((distance - 290.0).abs() < 5.0);
/// ```
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_KM)
}

/// Calculates the great-circle distance between two coordinates in meters.
#[inline]
pub fn haversine_distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_M)
}

#[inline]
fn haversine_distance_with_radius(from: &Coordinate, to: &Coordinate, radius: f64) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    radius * c
}
