//! Configuration commands

use anyhow::Result;
use gigmap_core::config::Config;
use owo_colors::OwoColorize;
use serde_json::json;

use super::is_json;

pub fn show(config: &Config) -> Result<()> {
    if let Some(path) = &config.path {
        println!("# loaded from {}", path.display());
    } else {
        println!("# built-in defaults");
    }
    print!("{}", toml::to_string_pretty(&config.schema)?);
    Ok(())
}

/// Loading already validated; report what was checked.
pub fn validate(config: &Config, format: &str) -> Result<()> {
    let source = config
        .path
        .as_ref()
        .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());

    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(&json!({ "valid": true, "source": source }))?);
    } else {
        println!("{} configuration is valid ({source})", "✓".green());
    }
    Ok(())
}
