//! Marketplace logic for the Gigmap client.
//!
//! Everything here sits between the UI and the managed backend:
//!
//! - **Model**: profiles, listings (workers, services, ads), reviews, notifications
//! - **Presence**: online/offline with a time-decay rule on `lastSeen`
//! - **Expiry**: countdown text, urgency tiers and a polling ticker
//! - **Author sync**: fan-out of a changed profile photo into listing snapshots
//! - **Ratings**: client-side review aggregation written to listing and profile
//! - **Notifications**: the session-stable "new" marker
//! - **Favorites**: composite favorite keys
//!
//! Backend access goes through the [`store::DocumentStore`] capability trait;
//! [`memory::MemoryStore`] implements it in process.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use gigmap_market::presence::is_online;
//!
//! let now = Utc::now();
//! assert!(is_online("u1", Some("u1"), Some(false), None, now));
//! assert!(!is_online("u2", Some("u1"), Some(true), Some(now - Duration::minutes(10)), now));
//! ```

pub mod author_sync;
pub mod error;
pub mod expiry;
pub mod favorites;
pub mod memory;
pub mod model;
pub mod notifications;
pub mod presence;
pub mod profile;
pub mod rating;
pub mod store;

pub use error::{MarketError, Result};
pub use model::{AuthorSnapshot, Listing, ListingKind, ListingStatus, Location, Notification, Profile, Review};
