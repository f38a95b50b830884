//! In-process cache storage.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use sw_core::AssetResponse;

use crate::error::{CacheError, CacheResult};
use crate::store::CacheStorage;

type Regions = HashMap<String, BTreeMap<String, AssetResponse>>;

/// In-memory cache storage (for development/testing and embedding).
///
/// Keys within a region are returned in sorted order.
#[derive(Default)]
pub struct MemoryCacheStorage {
    regions: RwLock<Regions>,
}

impl MemoryCacheStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CacheResult<RwLockReadGuard<'_, Regions>> {
        self.regions
            .read()
            .map_err(|_| CacheError::StoreError("memory storage lock poisoned".to_string()))
    }

    fn write(&self) -> CacheResult<RwLockWriteGuard<'_, Regions>> {
        self.regions
            .write()
            .map_err(|_| CacheError::StoreError("memory storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, region: &str) -> CacheResult<()> {
        self.write()?.entry(region.to_string()).or_default();
        Ok(())
    }

    async fn has(&self, region: &str) -> CacheResult<bool> {
        Ok(self.read()?.contains_key(region))
    }

    async fn delete(&self, region: &str) -> CacheResult<bool> {
        Ok(self.write()?.remove(region).is_some())
    }

    async fn regions(&self) -> CacheResult<Vec<String>> {
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn match_entry(&self, region: &str, key: &str) -> CacheResult<Option<AssetResponse>> {
        Ok(self
            .read()?
            .get(region)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(&self, region: &str, key: &str, response: AssetResponse) -> CacheResult<()> {
        let mut regions = self.write()?;
        let entries = regions
            .get_mut(region)
            .ok_or_else(|| CacheError::RegionMissing(region.to_string()))?;
        entries.insert(key.to_string(), response);
        Ok(())
    }

    async fn remove(&self, region: &str, key: &str) -> CacheResult<bool> {
        Ok(self
            .write()?
            .get_mut(region)
            .map(|entries| entries.remove(key).is_some())
            .unwrap_or(false))
    }

    async fn keys(&self, region: &str) -> CacheResult<Vec<String>> {
        Ok(self
            .read()?
            .get(region)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_is_lazy_and_idempotent() {
        let storage = MemoryCacheStorage::new();
        assert!(!storage.has("a").await.unwrap());

        storage.open("a").await.unwrap();
        storage.put("a", "k", AssetResponse::ok("v")).await.unwrap();
        storage.open("a").await.unwrap();

        assert!(storage.has("a").await.unwrap());
        assert_eq!(storage.keys("a").await.unwrap(), vec!["k"]);
    }

    #[tokio::test]
    async fn test_put_requires_open_region() {
        let storage = MemoryCacheStorage::new();
        let err = storage.put("nope", "k", AssetResponse::ok("v")).await.unwrap_err();
        assert!(matches!(err, CacheError::RegionMissing(r) if r == "nope"));
    }

    #[tokio::test]
    async fn test_reads_on_missing_region_are_empty() {
        let storage = MemoryCacheStorage::new();
        assert!(storage.match_entry("nope", "k").await.unwrap().is_none());
        assert!(storage.keys("nope").await.unwrap().is_empty());
        assert!(!storage.remove("nope", "k").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_drops_entries() {
        let storage = MemoryCacheStorage::new();
        storage.open("a").await.unwrap();
        storage.put("a", "k", AssetResponse::ok("v")).await.unwrap();

        assert!(storage.delete("a").await.unwrap());
        assert!(!storage.delete("a").await.unwrap());
        assert!(!storage.has("a").await.unwrap());

        storage.open("a").await.unwrap();
        assert!(storage.keys("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_regions_sorted() {
        let storage = MemoryCacheStorage::new();
        storage.open("temp").await.unwrap();
        storage.open("content").await.unwrap();
        assert_eq!(storage.regions().await.unwrap(), vec!["content", "temp"]);
    }

    #[tokio::test]
    async fn test_body_round_trips_in_memory() {
        let storage = MemoryCacheStorage::new();
        storage.open("a").await.unwrap();
        let resp = AssetResponse::ok(vec![0u8, 1, 2]).with_header("etag", "x");
        storage.put("a", "k", resp.clone()).await.unwrap();
        assert_eq!(storage.match_entry("a", "k").await.unwrap(), Some(resp));
    }
}
