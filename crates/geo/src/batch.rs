//! Batch distance calculations with optional parallelism.
//!
//! Listing feeds (workers, services, ads) compute the viewer's distance to
//! every card on the page and show the nearest first.

use crate::{haversine_distance, Coordinate, ParseDegrees};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Result of a distance calculation for a single listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    /// The listing ID
    pub id: String,
    /// Distance in kilometers, `None` if the listing has no usable position
    pub distance: Option<f64>,
}

/// Input item for batch distance calculation.
///
/// Coordinates are kept as raw document values since listings written by
/// older clients store them as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationItem {
    /// Listing ID
    pub id: String,
    #[serde(default)]
    pub latitude: serde_json::Value,
    #[serde(default)]
    pub longitude: serde_json::Value,
}

/// Calculate distances from a viewer position to multiple listings.
///
/// # Example
/// ```
/// use gigmap_geo::{calculate_distances, Coordinate, LocationItem};
/// use serde_json::json;
///
/// let items = vec![
///     LocationItem { id: "w1".into(), latitude: json!(13.0827), longitude: json!(80.2707) },
///     LocationItem { id: "w2".into(), latitude: json!("12.97"), longitude: json!("77.59") },
/// ];
///
/// let results = calculate_distances(Coordinate::new(12.9716, 77.5946), &items);
/// assert_eq!(results.len(), 2);
/// assert!(results[1].distance.unwrap() < 1.0);
/// ```
pub fn calculate_distances(viewer: Coordinate, items: &[LocationItem]) -> Vec<DistanceResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items
            .par_iter()
            .map(|item| calculate_single_distance(&viewer, item))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items
            .iter()
            .map(|item| calculate_single_distance(&viewer, item))
            .collect()
    }
}

/// Calculate distances and return them nearest first.
///
/// Listings without a usable position keep their relative order at the end.
pub fn calculate_distances_sorted(
    viewer: Coordinate,
    items: &[LocationItem],
    max_results: Option<usize>,
) -> Vec<DistanceResult> {
    let mut results = calculate_distances(viewer, items);
    results.sort_by(|a, b| compare_distance(a.distance, b.distance));

    if let Some(max) = max_results {
        results.truncate(max);
    }

    results
}

/// Keep listings within `radius_km` of the viewer, nearest first.
pub fn calculate_distances_within_radius(
    viewer: Coordinate,
    items: &[LocationItem],
    radius_km: f64,
) -> Vec<DistanceResult> {
    let mut results = calculate_distances(viewer, items);
    results.retain(|r| r.distance.is_some_and(|d| d <= radius_km));
    results.sort_by(|a, b| compare_distance(a.distance, b.distance));
    results
}

/// Sort any listing type nearest first, given accessors for its position.
///
/// The sort is stable, so equal distances and unknown positions keep their
/// feed order.
pub fn sort_by_distance<T, F, A, B>(viewer: Coordinate, items: &mut [T], position: F)
where
    F: Fn(&T) -> (A, B),
    A: ParseDegrees,
    B: ParseDegrees,
{
    items.sort_by_cached_key(|item| {
        let (lat, lon) = position(item);
        DistanceKey(Coordinate::parse(lat, lon).map(|c| haversine_distance(&viewer, &c)))
    });
}

#[derive(PartialEq)]
struct DistanceKey(Option<f64>);

impl Eq for DistanceKey {}

impl PartialOrd for DistanceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DistanceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_distance(self.0, other.0)
    }
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[inline]
fn calculate_single_distance(viewer: &Coordinate, item: &LocationItem) -> DistanceResult {
    let distance = Coordinate::parse(&item.latitude, &item.longitude)
        .map(|coord| haversine_distance(viewer, &coord));

    DistanceResult {
        id: item.id.clone(),
        distance,
    }
}
