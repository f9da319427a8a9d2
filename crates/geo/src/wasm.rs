//! WASM bindings for the geo crate.
//!
//! These bindings let the browser client compute listing distances without
//! re-implementing the formula in JavaScript.

use crate::{batch::calculate_distances_sorted, distance_km, format_distance, Coordinate, LocationItem};
use wasm_bindgen::prelude::*;

/// Distance in kilometers, or `undefined` if any input is not a number.
#[wasm_bindgen(js_name = distanceKm)]
pub fn distance_km_js(lat1: JsValue, lon1: JsValue, lat2: JsValue, lon2: JsValue) -> Option<f64> {
    distance_km(js_degrees(&lat1), js_degrees(&lon1), js_degrees(&lat2), js_degrees(&lon2))
}

/// Display text for a distance ("457m", "290.2 km" or "--").
#[wasm_bindgen(js_name = formatDistance)]
pub fn format_distance_js(distance_km: Option<f64>) -> String {
    format_distance(distance_km)
}

/// Sort listings nearest first.
///
/// # Arguments
/// * `viewer_lat` - Viewer's latitude
/// * `viewer_lng` - Viewer's longitude
/// * `listings_json` - JSON array of `{id, latitude, longitude}`
/// * `max_results` - Maximum results to return (0 for all)
///
/// # Returns
/// JSON string of `{id, distance}` sorted nearest first
#[wasm_bindgen(js_name = sortListingsByDistance)]
pub fn sort_listings_by_distance(
    viewer_lat: f64,
    viewer_lng: f64,
    listings_json: &str,
    max_results: u32,
) -> Result<String, JsValue> {
    let items: Vec<LocationItem> = serde_json::from_str(listings_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {e}")))?;

    let max = if max_results == 0 { None } else { Some(max_results as usize) };
    let results = calculate_distances_sorted(Coordinate::new(viewer_lat, viewer_lng), &items, max);

    serde_json::to_string(&results)
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {e}")))
}

fn js_degrees(value: &JsValue) -> Option<f64> {
    value.as_f64().or_else(|| value.as_string().and_then(|s| s.trim().parse().ok()))
}
