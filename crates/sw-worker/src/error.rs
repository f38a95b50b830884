//! Worker error types.

use sw_cache::CacheError;
use sw_core::ManifestError;
use sw_fetch::FetchError;

/// Error type for worker entry points.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// A network fetch failed (or a batch member returned non-2xx).
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// A cache region operation failed.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// The recorded manifest could not be decoded.
    #[error("Manifest record unreadable: {0}")]
    Manifest(#[from] ManifestError),
}
