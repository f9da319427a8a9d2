//! HTTP client for Gigmap backend endpoints
//!
//! Covers the calls the marketplace makes outside the document database:
//!
//! - **Geocoding**: reverse geocoding and place autocomplete through the
//!   geocoding proxy, falling back to the backend callable function when the
//!   proxy fails or takes longer than its timeout
//! - **Storage**: signed-URL uploads, legacy CDN preset uploads and deletes
//!
//! Failures are reported, never retried; callers offer a manual retry.
//!
//! # Example
//!
//! ```rust,no_run
//! use gigmap_api_client::{ClientConfig, GigmapClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GigmapClient::with_config(ClientConfig::from_env()?)?;
//!
//!     let place = client.geocoding().reverse(12.9716, 77.5946).await?;
//!     println!("{}, {} {}", place.area, place.city, place.pincode);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;

pub use client::GigmapClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::GigmapClient;
    pub use crate::config::ClientConfig;
    pub use crate::endpoints::{GeocodeSource, GeocodingApi, StorageApi};
    pub use crate::error::{ApiError, ApiResult};
}
