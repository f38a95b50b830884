//! Cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur when using cache regions.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the backing store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// Write to a region that has not been opened (or was deleted).
    #[error("Cache region '{0}' does not exist")]
    RegionMissing(String),

    /// Failed to serialize/deserialize entry metadata.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to perform store operation.
    #[error("Store operation failed: {0}")]
    StoreError(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An entry could not be read back.
    #[error("Corrupt entry '{key}' in region '{region}': {reason}")]
    Corrupt {
        region: String,
        key: String,
        reason: String,
    },
}
