//! Distance command

use anyhow::Result;
use gigmap_geo::{distance_km, format_distance};
use serde_json::json;

use super::is_json;

/// Print the "distance away" label for two positions.
///
/// Unparseable input prints the placeholder rather than failing, the same
/// as a listing card with a broken position.
pub fn run(lat1: &str, lon1: &str, lat2: &str, lon2: &str, format: &str) -> Result<()> {
    let km = distance_km(lat1, lon1, lat2, lon2);
    tracing::debug!(?km, "distance computed");

    if is_json(format) {
        let out = json!({ "km": km, "display": format_distance(km) });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", format_distance(km));
    }
    Ok(())
}
