//! Configuration loading and schema definitions
//!
//! Shared configuration types used by every Gigmap crate.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
