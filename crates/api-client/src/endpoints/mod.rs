//! Endpoint-specific API implementations
//!
//! | Module | Backend | Description |
//! |--------|---------|-------------|
//! | `geocoding` | geocoding proxy, `geocode` callable | Reverse geocoding and autocomplete |
//! | `storage` | upload-url function, object API, media CDN | Photo uploads and deletes |

pub mod geocoding;
pub mod storage;

pub use geocoding::{GeocodeSource, GeocodingApi};
pub use storage::{StorageApi, UploadPath};
