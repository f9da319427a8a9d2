//! Error types for the API client

use gigmap_core::ErrorCode;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Request timeout
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Geocoder response could not be normalized
    #[error("Geocoding failed: {0}")]
    Geocode(#[from] gigmap_geo::GeoError),

    /// Upload rejected before any network call
    #[error("Upload rejected: {0}")]
    Upload(#[from] gigmap_image::ImageError),

    /// Both the proxy and the fallback function failed
    #[error("Geocoding unavailable (proxy: {proxy}; fallback: {fallback})")]
    GeocodingUnavailable {
        /// Why the proxy attempt failed
        proxy: String,
        /// Error from the fallback function
        fallback: Box<ApiError>,
    },
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Whether offering the user a manual retry makes sense
    ///
    /// Nothing in this crate retries automatically.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::ApiResponse { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout(_) => true,
            Self::GeocodingUnavailable { fallback, .. } => fallback.is_retryable(),
            Self::Config(_) | Self::Json(_) | Self::UnexpectedResponse(_) | Self::Geocode(_) | Self::Upload(_) => false,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if *status >= 500)
    }

    /// Map onto the shared error code space
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout(_) => ErrorCode::Timeout,
            Self::Request(e) if e.is_timeout() => ErrorCode::Timeout,
            Self::Request(_) => ErrorCode::NetworkError,
            Self::ApiResponse { status: 401, .. } => ErrorCode::Unauthenticated,
            Self::ApiResponse { status: 403, .. } => ErrorCode::PermissionDenied,
            Self::ApiResponse { status: 404, .. } => ErrorCode::NotFound,
            Self::ApiResponse { status, .. } if *status >= 500 => ErrorCode::Unavailable,
            Self::ApiResponse { .. } | Self::UnexpectedResponse(_) | Self::Json(_) => ErrorCode::InvalidInput,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Geocode(_) => ErrorCode::InvalidInput,
            Self::Upload(gigmap_image::ImageError::TooLarge { .. }) => ErrorCode::FileTooLarge,
            Self::Upload(_) => ErrorCode::ValidationError,
            Self::GeocodingUnavailable { .. } => ErrorCode::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let err = ApiError::api_response(503, "down");
        assert!(err.is_server_error());
        assert!(err.is_retryable());
        assert_eq!(err.code(), ErrorCode::Unavailable);

        let err = ApiError::api_response(403, "not yours");
        assert!(err.is_client_error());
        assert!(!err.is_retryable());
        assert_eq!(err.code(), ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_upload_rejections_are_not_retryable() {
        let err = ApiError::from(gigmap_image::ImageError::TooLarge { size: 10, limit: 5 });
        assert!(!err.is_retryable());
        assert_eq!(err.code(), ErrorCode::FileTooLarge);
    }

    #[test]
    fn test_fallback_failure_reports_both() {
        let err = ApiError::GeocodingUnavailable {
            proxy: "timed out after 3s".into(),
            fallback: Box::new(ApiError::Timeout(Duration::from_secs(30))),
        };
        let message = err.to_string();
        assert!(message.contains("timed out after 3s"));
        assert!(err.is_retryable());
    }
}
