//! Configuration schema definitions
//!
//! Every field has a serde default so a partial file only overrides what it
//! names.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub presence: PresenceConfig,

    #[serde(default)]
    pub expiry: ExpiryConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub geocoding: GeocodingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub cropper: CropperConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Reject values that would make the client behave inconsistently
    pub fn validate(&self) -> Result<()> {
        if self.presence.fresh_within_minutes >= self.presence.stale_after_minutes {
            return Err(Error::config_invalid(
                "presence.fresh_within_minutes must be below presence.stale_after_minutes",
            ));
        }
        if self.expiry.critical_minutes >= self.expiry.warning_minutes {
            return Err(Error::config_invalid(
                "expiry.critical_minutes must be below expiry.warning_minutes",
            ));
        }
        if self.expiry.refresh_interval_secs == 0 {
            return Err(Error::config_invalid("expiry.refresh_interval_secs cannot be zero"));
        }
        if self.sync.reserved_ops >= self.sync.max_batch_ops {
            return Err(Error::config_invalid(
                "sync.reserved_ops must leave room below sync.max_batch_ops",
            ));
        }
        if self.cropper.output_size == 0 {
            return Err(Error::config_invalid("cropper.output_size cannot be zero"));
        }
        if !(1..=100).contains(&self.cropper.jpeg_quality) {
            return Err(Error::config_invalid("cropper.jpeg_quality must be within 1..=100"));
        }
        if self.geocoding.proxy_timeout_secs == 0 {
            return Err(Error::config_invalid("geocoding.proxy_timeout_secs cannot be zero"));
        }
        Ok(())
    }
}

/// Online/offline decay thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Past this many minutes since last seen a user is offline
    #[serde(default = "default_stale_after")]
    pub stale_after_minutes: i64,

    /// Within this many minutes since last seen a user is online
    #[serde(default = "default_fresh_within")]
    pub fresh_within_minutes: i64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            stale_after_minutes: default_stale_after(),
            fresh_within_minutes: default_fresh_within(),
        }
    }
}

fn default_stale_after() -> i64 {
    5
}

fn default_fresh_within() -> i64 {
    2
}

/// Listing expiry display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryConfig {
    #[serde(default = "default_critical_minutes")]
    pub critical_minutes: i64,

    #[serde(default = "default_warning_minutes")]
    pub warning_minutes: i64,

    /// How often a mounted countdown recomputes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Expiry timestamps in or after this year mean "never expires"
    #[serde(default = "default_never_year")]
    pub never_year_threshold: i32,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            critical_minutes: default_critical_minutes(),
            warning_minutes: default_warning_minutes(),
            refresh_interval_secs: default_refresh_interval(),
            never_year_threshold: default_never_year(),
        }
    }
}

fn default_critical_minutes() -> i64 {
    5
}

fn default_warning_minutes() -> i64 {
    60
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_never_year() -> i32 {
    9000
}

/// Author fan-out batching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Hard per-batch operation ceiling of the document store
    #[serde(default = "default_max_batch_ops")]
    pub max_batch_ops: usize,

    /// Operations kept free in each batch for the profile writes
    #[serde(default = "default_reserved_ops")]
    pub reserved_ops: usize,
}

impl SyncConfig {
    /// Number of listing patches placed in one batch
    pub fn batch_size(&self) -> usize {
        self.max_batch_ops.saturating_sub(self.reserved_ops).max(1)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_batch_ops: default_max_batch_ops(),
            reserved_ops: default_reserved_ops(),
        }
    }
}

fn default_max_batch_ops() -> usize {
    500
}

fn default_reserved_ops() -> usize {
    50
}

/// Geocoding proxy and fallback function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,

    #[serde(default = "default_callable_url")]
    pub callable_url: String,

    /// `locationiq` or `opencage`
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_proxy_timeout")]
    pub proxy_timeout_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            callable_url: default_callable_url(),
            provider: default_provider(),
            proxy_timeout_secs: default_proxy_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_proxy_url() -> String {
    "https://gigmap.app/api/geocode".to_string()
}

fn default_callable_url() -> String {
    "https://us-central1-gigmap.cloudfunctions.net/geocode".to_string()
}

fn default_provider() -> String {
    "locationiq".to_string()
}

fn default_proxy_timeout() -> u64 {
    3
}

fn default_request_timeout() -> u64 {
    30
}

/// Upload endpoints and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend function returning a signed upload URL
    #[serde(default = "default_signed_url_endpoint")]
    pub signed_url_endpoint: String,

    /// Object storage API used for deletions
    #[serde(default = "default_object_api_url")]
    pub object_api_url: String,

    #[serde(default = "default_cdn_cloud_name")]
    pub cdn_cloud_name: String,

    #[serde(default = "default_cdn_upload_preset")]
    pub cdn_upload_preset: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            signed_url_endpoint: default_signed_url_endpoint(),
            object_api_url: default_object_api_url(),
            cdn_cloud_name: default_cdn_cloud_name(),
            cdn_upload_preset: default_cdn_upload_preset(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_signed_url_endpoint() -> String {
    "https://gigmap.app/api/upload-url".to_string()
}

fn default_object_api_url() -> String {
    "https://gigmap.app/api/objects".to_string()
}

fn default_cdn_cloud_name() -> String {
    "gigmap".to_string()
}

fn default_cdn_upload_preset() -> String {
    "gigmap_unsigned".to_string()
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

/// Profile photo cropper output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropperConfig {
    #[serde(default = "default_output_size")]
    pub output_size: u32,

    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for CropperConfig {
    fn default() -> Self {
        Self {
            output_size: default_output_size(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

fn default_output_size() -> u32 {
    500
}

fn default_jpeg_quality() -> u8 {
    95
}

/// Logging output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ConfigSchema::default().validate().is_ok());
    }

    #[test]
    fn test_batch_size_leaves_margin() {
        let sync = SyncConfig::default();
        assert_eq!(sync.batch_size(), 450);
        assert!(sync.batch_size() < sync.max_batch_ops);
    }

    #[test]
    fn test_quality_out_of_range() {
        let mut schema = ConfigSchema::default();
        schema.cropper.jpeg_quality = 0;
        assert!(schema.validate().is_err());
    }
}
