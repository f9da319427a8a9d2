//! Geocoder response normalization.
//!
//! The geocoding proxy and its fallback function pass provider responses
//! through untouched. LocationIQ and OpenCage name the same address parts
//! differently, so both are folded into one [`Place`].

use crate::{Coordinate, GeoError, ParseDegrees, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Supported geocoding providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocodeProvider {
    #[default]
    LocationIq,
    OpenCage,
}

impl GeocodeProvider {
    /// Name sent to the backend function as the provider selector.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocodeProvider::LocationIq => "locationiq",
            GeocodeProvider::OpenCage => "opencage",
        }
    }
}

impl fmt::Display for GeocodeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeocodeProvider {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "locationiq" => Ok(GeocodeProvider::LocationIq),
            "opencage" => Ok(GeocodeProvider::OpenCage),
            other => Err(GeoError::UnknownProvider(other.to_string())),
        }
    }
}

/// A resolved place, shaped like a listing's location block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Suburb or neighbourhood
    pub area: String,
    pub city: String,
    pub pincode: String,
    /// Nearby named feature, when the provider reports one
    pub landmark: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub display_name: String,
}

impl Place {
    /// Position of the place, if the provider returned one.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }
}

const AREA_KEYS: &[&str] = &["suburb", "neighbourhood", "quarter", "city_district"];
const CITY_KEYS: &[&str] = &["city", "town", "village", "county", "state_district"];
const PINCODE_KEYS: &[&str] = &["postcode"];
const LANDMARK_KEYS: &[&str] = &["road", "amenity", "building", "attraction"];

fn first_of(address: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| address.get(*k).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

fn place_from_parts(address: &Value, lat: &Value, lon: &Value, display: &Value) -> Place {
    Place {
        area: first_of(address, AREA_KEYS),
        city: first_of(address, CITY_KEYS),
        pincode: first_of(address, PINCODE_KEYS),
        landmark: first_of(address, LANDMARK_KEYS),
        latitude: lat.parse_degrees(),
        longitude: lon.parse_degrees(),
        display_name: display.as_str().unwrap_or_default().to_string(),
    }
}

fn locationiq_place(item: &Value) -> Place {
    place_from_parts(
        item.get("address").unwrap_or(&Value::Null),
        item.get("lat").unwrap_or(&Value::Null),
        item.get("lon").unwrap_or(&Value::Null),
        item.get("display_name").unwrap_or(&Value::Null),
    )
}

fn opencage_place(result: &Value) -> Place {
    let geometry = result.get("geometry").unwrap_or(&Value::Null);
    place_from_parts(
        result.get("components").unwrap_or(&Value::Null),
        geometry.get("lat").unwrap_or(&Value::Null),
        geometry.get("lng").unwrap_or(&Value::Null),
        result.get("formatted").unwrap_or(&Value::Null),
    )
}

fn opencage_results(response: &Value) -> Result<&Vec<Value>> {
    response
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| GeoError::UnexpectedResponse("missing `results` array".to_string()))
}

/// Normalize a reverse-geocoding response into a single place.
///
/// # Example
/// ```
/// use gigmap_geo::geocode::{normalize_reverse, GeocodeProvider};
/// use serde_json::json;
///
/// let response = json!({
///     "lat": "12.9784", "lon": "77.6408",
///     "display_name": "Indiranagar, Bengaluru",
///     "address": {"suburb": "Indiranagar", "city": "Bengaluru", "postcode": "560038"}
/// });
/// let place = normalize_reverse(GeocodeProvider::LocationIq, &response).unwrap();
/// assert_eq!(place.area, "Indiranagar");
/// assert_eq!(place.pincode, "560038");
/// ```
pub fn normalize_reverse(provider: GeocodeProvider, response: &Value) -> Result<Place> {
    match provider {
        GeocodeProvider::LocationIq => {
            if let Some(err) = response.get("error").and_then(Value::as_str) {
                return Err(GeoError::UnexpectedResponse(err.to_string()));
            }
            if !response.is_object() {
                return Err(GeoError::UnexpectedResponse("expected an object".to_string()));
            }
            Ok(locationiq_place(response))
        }
        GeocodeProvider::OpenCage => opencage_results(response)?
            .first()
            .map(opencage_place)
            .ok_or_else(|| GeoError::UnexpectedResponse("no results".to_string())),
    }
}

/// Normalize an autocomplete response into candidate places.
pub fn normalize_autocomplete(provider: GeocodeProvider, response: &Value) -> Result<Vec<Place>> {
    match provider {
        GeocodeProvider::LocationIq => response
            .as_array()
            .map(|items| items.iter().map(locationiq_place).collect())
            .ok_or_else(|| GeoError::UnexpectedResponse("expected an array".to_string())),
        GeocodeProvider::OpenCage => Ok(opencage_results(response)?.iter().map(opencage_place).collect()),
    }
}
