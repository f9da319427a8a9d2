//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Invalid coordinate values
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Geocoder provider name not recognised
    #[error("Unknown geocoding provider: {0}")]
    UnknownProvider(String),

    /// Geocoder response did not have the expected shape
    #[error("Unexpected geocoder response: {0}")]
    UnexpectedResponse(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Error code for integration with gigmap-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Invalid coordinate values
    InvalidCoordinate = 10001,
    /// Unknown provider
    UnknownProvider = 10002,
    /// Unexpected response shape
    UnexpectedResponse = 10003,
    /// JSON parsing error
    JsonParsing = 10004,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            GeoError::UnknownProvider(_) => GeoErrorCode::UnknownProvider,
            GeoError::UnexpectedResponse(_) => GeoErrorCode::UnexpectedResponse,
            GeoError::JsonError(_) => GeoErrorCode::JsonParsing,
        }
    }
}
