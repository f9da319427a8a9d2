//! Geocoding commands

use anyhow::Result;
use gigmap_api_client::{ClientConfig, GigmapClient};
use gigmap_core::config::Config;
use gigmap_geo::Place;
use owo_colors::OwoColorize;

use super::is_json;

fn client(config: &Config) -> Result<GigmapClient> {
    let client_config = ClientConfig::from_app_config(config).overlay_env()?;
    Ok(GigmapClient::with_config(client_config)?)
}

pub async fn reverse(config: &Config, latitude: f64, longitude: f64, format: &str) -> Result<()> {
    let place = client(config)?.geocoding().reverse(latitude, longitude).await?;

    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(&place)?);
    } else {
        print_place(&place);
    }
    Ok(())
}

pub async fn autocomplete(config: &Config, query: &str, format: &str) -> Result<()> {
    let places = client(config)?.geocoding().autocomplete(query).await?;

    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(&places)?);
        return Ok(());
    }

    if places.is_empty() {
        println!("{}", "No suggestions".dimmed());
    }
    for place in &places {
        print_place(place);
    }
    Ok(())
}

fn print_place(place: &Place) {
    println!("{}", place.display_name.bold());
    let parts = [
        ("Area", &place.area),
        ("City", &place.city),
        ("Pincode", &place.pincode),
        ("Landmark", &place.landmark),
    ];
    for (label, value) in parts {
        if !value.is_empty() {
            println!("  {label:<9} {value}");
        }
    }
    if let Some(coord) = place.coordinate() {
        println!("  {:<9} {:.5}, {:.5}", "Position", coord.latitude, coord.longitude);
    }
}
