//! Subcommand implementations

pub mod config;
pub mod crop;
pub mod distance;
pub mod expiry;
pub mod geocode;
pub mod presence;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp given on the command line.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("invalid timestamp '{value}', expected RFC 3339"))
}

/// `--now` override or the wall clock.
pub fn now_or(value: Option<&str>) -> Result<DateTime<Utc>> {
    value.map_or_else(|| Ok(Utc::now()), parse_time)
}

pub fn is_json(format: &str) -> bool {
    format.eq_ignore_ascii_case("json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_normalizes_offset() {
        let t = parse_time("2024-05-01T17:30:00+05:30").unwrap();
        assert_eq!(t.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        let err = parse_time("yesterday").unwrap_err();
        assert!(err.to_string().contains("RFC 3339"));
    }
}
