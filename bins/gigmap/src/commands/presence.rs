//! Presence command

use anyhow::Result;
use gigmap_core::config::Config;
use gigmap_market::presence::PresencePolicy;
use owo_colors::OwoColorize;
use serde_json::json;

use super::{is_json, now_or, parse_time};

pub struct Args {
    pub target: String,
    pub viewer: Option<String>,
    pub online: Option<bool>,
    pub last_seen: Option<String>,
    pub now: Option<String>,
}

pub fn run(config: &Config, args: &Args, format: &str) -> Result<()> {
    let policy = PresencePolicy::from(&config.schema.presence);
    let last_seen = args.last_seen.as_deref().map(parse_time).transpose()?;
    let now = now_or(args.now.as_deref())?;

    let online = policy.is_online(&args.target, args.viewer.as_deref(), args.online, last_seen, now);

    if is_json(format) {
        let out = json!({ "uid": args.target, "online": online });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if online {
        println!("{} {}", "●".green(), "online".green());
    } else {
        println!("{} {}", "○".dimmed(), "offline".dimmed());
    }
    Ok(())
}
