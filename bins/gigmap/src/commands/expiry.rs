//! Expiry countdown command

use anyhow::Result;
use chrono::Utc;
use gigmap_core::config::Config;
use gigmap_market::expiry::{spawn_ticker, ExpiryColor, ExpiryDisplay, ExpiryPolicy, ExpiryTier};
use owo_colors::OwoColorize;
use std::time::Duration;

use super::{is_json, now_or, parse_time};

pub fn run(config: &Config, at: Option<&str>, now: Option<&str>, format: &str) -> Result<()> {
    let policy = ExpiryPolicy::from(&config.schema.expiry);
    let expiry = at.map(parse_time).transpose()?;
    let display = policy.format(expiry, now_or(now)?);

    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(&display)?);
        return Ok(());
    }

    match display {
        Some(display) => print_display(&display),
        None => println!("{}", "no expiry".dimmed()),
    }
    Ok(())
}

/// Tick until the listing expires or the process is interrupted.
pub async fn watch(config: &Config, at: Option<&str>) -> Result<()> {
    let policy = ExpiryPolicy::from(&config.schema.expiry);
    let expiry = at.map(parse_time).transpose()?;
    let period = Duration::from_secs(config.schema.expiry.refresh_interval_secs);

    let (mut rx, handle) = spawn_ticker(policy, expiry, period, Utc::now);

    loop {
        let current = rx.borrow_and_update().clone();
        let Some(display) = current else {
            println!("{}", "no expiry".dimmed());
            break;
        };
        print_display(&display);
        if matches!(display.tier, ExpiryTier::Expired | ExpiryTier::Never) {
            break;
        }
        if rx.changed().await.is_err() {
            break;
        }
    }

    drop(rx);
    handle.await?;
    Ok(())
}

fn print_display(display: &ExpiryDisplay) {
    if display.tier == ExpiryTier::Never {
        println!("{}", "never expires".dimmed());
        return;
    }
    match display.color {
        ExpiryColor::Neutral => println!("{}", display.text),
        ExpiryColor::Amber => println!("{}", display.text.yellow()),
        ExpiryColor::Red => println!("{}", display.text.red().bold()),
        ExpiryColor::Gray => println!("{}", display.text.dimmed()),
    }
}
