//! Configuration for the Gigmap API client
//!
//! Starts from the application config (or built-in defaults) and overlays
//! `GIGMAP_*` environment variables.

use crate::error::{ApiError, ApiResult};
use gigmap_core::config::Config;
use gigmap_geo::GeocodeProvider;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default media CDN API base
const DEFAULT_CDN_API_URL: &str = "https://api.cloudinary.com/v1_1";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Geocoding proxy endpoint, tried first
    pub proxy_url: String,
    /// Backend callable function used when the proxy fails
    pub callable_url: String,
    /// Provider selector passed to the callable and used to read responses
    pub provider: GeocodeProvider,
    /// Budget for the proxy before falling back
    #[serde(with = "secs")]
    pub proxy_timeout: Duration,
    /// Timeout for every other request
    #[serde(with = "secs")]
    pub timeout: Duration,
    /// Backend function returning signed upload URLs
    pub signed_url_endpoint: String,
    /// Object storage API (public URLs and deletes)
    pub object_api_url: String,
    /// Media CDN API base for legacy uploads
    pub cdn_api_url: String,
    /// Media CDN account name
    pub cdn_cloud_name: String,
    /// Unsigned upload preset on the media CDN
    pub cdn_upload_preset: String,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
    /// Session token sent as a bearer token to backend functions
    pub auth_token: Option<String>,
}

mod secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_app_config(&Config::default())
    }
}

impl ClientConfig {
    /// Build from the loaded application configuration.
    ///
    /// An unrecognised provider name falls back to the default provider.
    #[must_use]
    pub fn from_app_config(config: &Config) -> Self {
        let geocoding = &config.schema.geocoding;
        let storage = &config.schema.storage;

        Self {
            proxy_url: geocoding.proxy_url.clone(),
            callable_url: geocoding.callable_url.clone(),
            provider: geocoding.provider.parse().unwrap_or_default(),
            proxy_timeout: Duration::from_secs(geocoding.proxy_timeout_secs),
            timeout: Duration::from_secs(geocoding.request_timeout_secs),
            signed_url_endpoint: storage.signed_url_endpoint.clone(),
            object_api_url: storage.object_api_url.clone(),
            cdn_api_url: DEFAULT_CDN_API_URL.to_string(),
            cdn_cloud_name: storage.cdn_cloud_name.clone(),
            cdn_upload_preset: storage.cdn_upload_preset.clone(),
            max_upload_bytes: storage.max_upload_bytes,
            auth_token: None,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables on top of the defaults:
    /// - `GIGMAP_GEOCODE_PROXY_URL`, `GIGMAP_GEOCODE_CALLABLE_URL`
    /// - `GIGMAP_GEOCODE_PROVIDER`: `locationiq` or `opencage`
    /// - `GIGMAP_PROXY_TIMEOUT_SECS`, `GIGMAP_TIMEOUT_SECS`
    /// - `GIGMAP_SIGNED_URL_ENDPOINT`, `GIGMAP_OBJECT_API_URL`
    /// - `GIGMAP_CDN_API_URL`, `GIGMAP_CDN_CLOUD_NAME`, `GIGMAP_CDN_UPLOAD_PRESET`
    /// - `GIGMAP_AUTH_TOKEN`
    pub fn from_env() -> ApiResult<Self> {
        Self::default().overlay_env()
    }

    /// Apply `GIGMAP_*` environment variables to this configuration.
    pub fn overlay_env(mut self) -> ApiResult<Self> {
        let strings = [
            ("GIGMAP_GEOCODE_PROXY_URL", &mut self.proxy_url),
            ("GIGMAP_GEOCODE_CALLABLE_URL", &mut self.callable_url),
            ("GIGMAP_SIGNED_URL_ENDPOINT", &mut self.signed_url_endpoint),
            ("GIGMAP_OBJECT_API_URL", &mut self.object_api_url),
            ("GIGMAP_CDN_API_URL", &mut self.cdn_api_url),
            ("GIGMAP_CDN_CLOUD_NAME", &mut self.cdn_cloud_name),
            ("GIGMAP_CDN_UPLOAD_PRESET", &mut self.cdn_upload_preset),
        ];
        for (var, field) in strings {
            if let Ok(value) = env::var(var) {
                *field = value;
            }
        }

        if let Ok(provider) = env::var("GIGMAP_GEOCODE_PROVIDER") {
            self.provider = provider
                .parse()
                .map_err(|_| ApiError::config(format!("GIGMAP_GEOCODE_PROVIDER: unknown provider `{provider}`")))?;
        }
        if let Some(secs) = env_secs("GIGMAP_PROXY_TIMEOUT_SECS")? {
            self.proxy_timeout = secs;
        }
        if let Some(secs) = env_secs("GIGMAP_TIMEOUT_SECS")? {
            self.timeout = secs;
        }
        if let Ok(token) = env::var("GIGMAP_AUTH_TOKEN") {
            self.auth_token = Some(token);
        }

        Ok(self)
    }

    /// Media CDN image upload endpoint
    #[must_use]
    pub fn cdn_upload_url(&self) -> String {
        format!("{}/{}/image/upload", self.cdn_api_url.trim_end_matches('/'), self.cdn_cloud_name)
    }

    /// Builder-style method to set the geocoding proxy URL
    #[must_use]
    pub fn with_proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = url.into();
        self
    }

    /// Builder-style method to set the fallback callable URL
    #[must_use]
    pub fn with_callable_url(mut self, url: impl Into<String>) -> Self {
        self.callable_url = url.into();
        self
    }

    /// Builder-style method to set the geocoding provider
    #[must_use]
    pub fn with_provider(mut self, provider: GeocodeProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Builder-style method to set the proxy timeout
    #[must_use]
    pub fn with_proxy_timeout(mut self, timeout: Duration) -> Self {
        self.proxy_timeout = timeout;
        self
    }

    /// Builder-style method to set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to point every storage endpoint at one base URL
    #[must_use]
    pub fn with_storage_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.signed_url_endpoint = format!("{base}/upload-url");
        self.object_api_url = format!("{base}/objects");
        self.cdn_api_url = format!("{base}/cdn");
        self
    }

    /// Builder-style method to set the upload size limit
    #[must_use]
    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    /// Builder-style method to set the auth token
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        let urls = [
            ("proxy_url", &self.proxy_url),
            ("callable_url", &self.callable_url),
            ("signed_url_endpoint", &self.signed_url_endpoint),
            ("object_api_url", &self.object_api_url),
            ("cdn_api_url", &self.cdn_api_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ApiError::config(format!("{name} must start with http:// or https://")));
            }
        }

        if self.proxy_timeout.is_zero() || self.timeout.is_zero() {
            return Err(ApiError::config("timeouts cannot be zero"));
        }

        if self.cdn_upload_preset.is_empty() {
            return Err(ApiError::config("cdn_upload_preset cannot be empty"));
        }

        Ok(())
    }
}

fn env_secs(var: &str) -> ApiResult<Option<Duration>> {
    match env::var(var) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| ApiError::config(format!("{var} must be a whole number of seconds, got `{raw}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.proxy_timeout, Duration::from_secs(3));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.provider, GeocodeProvider::LocationIq);
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cdn_upload_url() {
        let config = ClientConfig::default();
        assert_eq!(config.cdn_upload_url(), "https://api.cloudinary.com/v1_1/gigmap/image/upload");
    }

    #[test]
    fn test_from_app_config() {
        let app = Config::from_toml(
            r#"
            [geocoding]
            provider = "opencage"
            proxy_timeout_secs = 5
            "#,
        )
        .unwrap();
        let config = ClientConfig::from_app_config(&app);
        assert_eq!(config.provider, GeocodeProvider::OpenCage);
        assert_eq!(config.proxy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::default()
            .with_proxy_url("http://localhost:9000/geocode")
            .with_storage_base("http://localhost:9000/")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.proxy_url, "http://localhost:9000/geocode");
        assert_eq!(config.object_api_url, "http://localhost:9000/objects");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_validation() {
        let invalid = ClientConfig::default().with_callable_url("geocode");
        assert!(invalid.validate().is_err());

        let zero = ClientConfig::default().with_proxy_timeout(Duration::ZERO);
        assert!(zero.validate().is_err());
    }
}
