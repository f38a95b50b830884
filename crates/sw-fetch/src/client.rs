//! The fetch abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use sw_core::{AssetRequest, AssetResponse};

use crate::error::FetchError;

/// Host network fetch primitive.
///
/// A returned `Ok` means a response arrived, whatever its status. `Err` is a
/// transport-level failure.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform one request.
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        (**self).fetch(request).await
    }
}

/// Fetch and require a 2xx response.
pub async fn fetch_ok<F: Fetcher + ?Sized>(
    fetcher: &F,
    request: &AssetRequest,
) -> Result<AssetResponse, FetchError> {
    let response = fetcher.fetch(request).await?;
    if response.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Http {
            status: response.status,
            url: request.url.clone(),
        })
    }
}
