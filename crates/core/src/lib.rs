//! Core utilities for the Gigmap marketplace client
//!
//! This crate provides shared functionality used across the listing, geo,
//! image and API crates:
//!
//! - **Error handling**: coded errors with context and recovery suggestions
//! - **Configuration**: TOML-based configuration with defaults and validation
//! - **Session cache**: process-wide cached state with TTLs and subscribers
//! - **Validation**: listing-draft checks performed before any network call
//!
//! # Example
//!
//! ```rust
//! use gigmap_core::{cache::SessionCache, config::Config};
//!
//! let config = Config::default();
//! assert_eq!(config.schema.sync.batch_size(), 450);
//!
//! let cache = SessionCache::new();
//! cache.set("profile:u1", &"alice", None).unwrap();
//! assert_eq!(cache.get::<String>("profile:u1").unwrap().as_deref(), Some("alice"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheEvent, SessionCache};
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::validation::{ListingDraft, ValidationResult, Validator};
}
