//! Error types for marketplace operations.

use gigmap_core::ErrorCode;
use thiserror::Error;

/// Result type alias for marketplace operations.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Errors raised by marketplace operations and document stores.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Input rejected before any backend call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Backend refused a read or write
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Document does not exist
    #[error("Document not found: {collection}/{id}")]
    NotFound {
        /// Collection name
        collection: String,
        /// Document id
        id: String,
    },

    /// Batch would exceed the store's per-commit ceiling
    #[error("Batch of {ops} operations exceeds the limit of {limit}")]
    BatchTooLarge {
        /// Operations queued
        ops: usize,
        /// Store ceiling
        limit: usize,
    },

    /// Backend unreachable or timed out
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Document did not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure in a shared core facility (cache, config)
    #[error(transparent)]
    Core(#[from] gigmap_core::Error),
}

impl MarketError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Whether this is one of the failures a background write may skip.
    ///
    /// Rating aggregation can race a listing deletion or hit a document the
    /// caller does not own; those sub-writes are logged and dropped.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::NotFound { .. })
    }

    /// Map onto the shared error code space.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::PermissionDenied(_) => ErrorCode::PermissionDenied,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::BatchTooLarge { .. } => ErrorCode::Internal,
            Self::Unavailable(_) => ErrorCode::Unavailable,
            Self::Json(_) => ErrorCode::InvalidInput,
            Self::Core(e) => e.code,
        }
    }
}
