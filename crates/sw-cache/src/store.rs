//! The cache storage abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use sw_core::AssetResponse;

use crate::error::CacheResult;

/// Host cache storage: named regions mapping request identity to a response.
///
/// Reads from a region that does not exist behave as reads from an empty
/// region. Writes to a missing region fail with
/// [`CacheError::RegionMissing`](crate::CacheError::RegionMissing); call
/// [`open`](CacheStorage::open) first.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a region, creating it if it does not exist.
    async fn open(&self, region: &str) -> CacheResult<()>;

    /// Check whether a region exists.
    async fn has(&self, region: &str) -> CacheResult<bool>;

    /// Delete a region with all its entries. Returns whether it existed.
    async fn delete(&self, region: &str) -> CacheResult<bool>;

    /// Names of all existing regions.
    async fn regions(&self) -> CacheResult<Vec<String>>;

    /// Look up a stored response.
    async fn match_entry(&self, region: &str, key: &str) -> CacheResult<Option<AssetResponse>>;

    /// Store a response, replacing any previous entry for the key.
    async fn put(&self, region: &str, key: &str, response: AssetResponse) -> CacheResult<()>;

    /// Remove an entry. Returns whether it existed.
    async fn remove(&self, region: &str, key: &str) -> CacheResult<bool>;

    /// All keys stored in a region.
    async fn keys(&self, region: &str) -> CacheResult<Vec<String>>;
}

#[async_trait]
impl<S: CacheStorage + ?Sized> CacheStorage for Arc<S> {
    async fn open(&self, region: &str) -> CacheResult<()> {
        (**self).open(region).await
    }

    async fn has(&self, region: &str) -> CacheResult<bool> {
        (**self).has(region).await
    }

    async fn delete(&self, region: &str) -> CacheResult<bool> {
        (**self).delete(region).await
    }

    async fn regions(&self) -> CacheResult<Vec<String>> {
        (**self).regions().await
    }

    async fn match_entry(&self, region: &str, key: &str) -> CacheResult<Option<AssetResponse>> {
        (**self).match_entry(region, key).await
    }

    async fn put(&self, region: &str, key: &str, response: AssetResponse) -> CacheResult<()> {
        (**self).put(region, key, response).await
    }

    async fn remove(&self, region: &str, key: &str) -> CacheResult<bool> {
        (**self).remove(region, key).await
    }

    async fn keys(&self, region: &str) -> CacheResult<Vec<String>> {
        (**self).keys(region).await
    }
}

/// A handle to one opened region of a [`CacheStorage`].
pub struct CacheRegion<'a, S: CacheStorage + ?Sized> {
    storage: &'a S,
    name: &'a str,
}

impl<'a, S: CacheStorage + ?Sized> CacheRegion<'a, S> {
    /// Open (creating if needed) a region and return a handle to it.
    pub async fn open(storage: &'a S, name: &'a str) -> CacheResult<Self> {
        storage.open(name).await?;
        Ok(Self { storage, name })
    }

    /// The region name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Look up a stored response.
    pub async fn match_entry(&self, key: &str) -> CacheResult<Option<AssetResponse>> {
        self.storage.match_entry(self.name, key).await
    }

    /// Store a response.
    pub async fn put(&self, key: &str, response: AssetResponse) -> CacheResult<()> {
        self.storage.put(self.name, key, response).await
    }

    /// Remove an entry.
    pub async fn remove(&self, key: &str) -> CacheResult<bool> {
        self.storage.remove(self.name, key).await
    }

    /// All keys in the region.
    pub async fn keys(&self) -> CacheResult<Vec<String>> {
        self.storage.keys(self.name).await
    }

    /// Copy every entry of `source` into this region verbatim.
    ///
    /// Returns the copied keys. Existing entries with the same key are
    /// overwritten.
    pub async fn copy_from(&self, source: &CacheRegion<'_, S>) -> CacheResult<Vec<String>> {
        let mut copied = Vec::new();
        for key in source.keys().await? {
            if let Some(response) = source.match_entry(&key).await? {
                self.put(&key, response).await?;
                copied.push(key);
            }
        }
        Ok(copied)
    }
}
