//! Cache storage backed by Spin's Key-Value Store.
//!
//! All regions share one store. Keys are namespaced:
//! - `region:<r>` marks an existing region
//! - `meta:<r>:<k>` holds entry metadata as JSON
//! - `body:<r>:<k>` holds the entry body
//!
//! `<r>` and `<k>` are unpadded URL-safe base64, so `:` never appears inside
//! a component.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use spin_sdk::key_value::Store;
use sw_core::AssetResponse;

use crate::error::{CacheError, CacheResult};
use crate::store::CacheStorage;

/// Cache storage in a Spin key-value store.
pub struct KvCacheStorage {
    store: Store,
}

impl KvCacheStorage {
    /// Open the default Key-Value store.
    pub fn open_default() -> CacheResult<Self> {
        let store = Store::open_default().map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self { store })
    }

    /// Open a named Key-Value store.
    pub fn open(label: &str) -> CacheResult<Self> {
        let store = Store::open(label).map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self { store })
    }

    fn all_keys(&self) -> CacheResult<Vec<String>> {
        self.store
            .get_keys()
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    fn exists(&self, key: &str) -> CacheResult<bool> {
        self.store
            .exists(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.store
            .get(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    fn set(&self, key: &str, value: &[u8]) -> CacheResult<()> {
        self.store
            .set(key, value)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    fn del(&self, key: &str) -> CacheResult<()> {
        self.store
            .delete(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }
}

fn encode(s: &str) -> String {
    URL_SAFE_NO_PAD.encode(s.as_bytes())
}

fn decode(s: &str) -> Option<String> {
    String::from_utf8(URL_SAFE_NO_PAD.decode(s).ok()?).ok()
}

fn marker_key(region: &str) -> String {
    format!("region:{}", encode(region))
}

fn meta_prefix(region: &str) -> String {
    format!("meta:{}:", encode(region))
}

fn meta_key(region: &str, key: &str) -> String {
    format!("{}{}", meta_prefix(region), encode(key))
}

fn body_key(region: &str, key: &str) -> String {
    format!("body:{}:{}", encode(region), encode(key))
}

#[async_trait]
impl CacheStorage for KvCacheStorage {
    async fn open(&self, region: &str) -> CacheResult<()> {
        let marker = marker_key(region);
        if !self.exists(&marker)? {
            self.set(&marker, b"1")?;
        }
        Ok(())
    }

    async fn has(&self, region: &str) -> CacheResult<bool> {
        self.exists(&marker_key(region))
    }

    async fn delete(&self, region: &str) -> CacheResult<bool> {
        let existed = self.exists(&marker_key(region))?;
        let entry_keys = self.keys(region).await?;
        for key in &entry_keys {
            self.del(&meta_key(region, key))?;
            self.del(&body_key(region, key))?;
        }
        self.del(&marker_key(region))?;
        Ok(existed)
    }

    async fn regions(&self) -> CacheResult<Vec<String>> {
        let mut names: Vec<String> = self
            .all_keys()?
            .iter()
            .filter_map(|k| k.strip_prefix("region:").and_then(decode))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn match_entry(&self, region: &str, key: &str) -> CacheResult<Option<AssetResponse>> {
        let Some(meta) = self.get(&meta_key(region, key))? else {
            return Ok(None);
        };
        let mut response: AssetResponse = serde_json::from_slice(&meta)?;
        response.body = self
            .get(&body_key(region, key))?
            .ok_or_else(|| CacheError::Corrupt {
                region: region.to_string(),
                key: key.to_string(),
                reason: "body missing".to_string(),
            })?;
        Ok(Some(response))
    }

    async fn put(&self, region: &str, key: &str, response: AssetResponse) -> CacheResult<()> {
        if !self.exists(&marker_key(region))? {
            return Err(CacheError::RegionMissing(region.to_string()));
        }
        self.set(&body_key(region, key), &response.body)?;
        self.set(&meta_key(region, key), &serde_json::to_vec(&response)?)
    }

    async fn remove(&self, region: &str, key: &str) -> CacheResult<bool> {
        let meta = meta_key(region, key);
        let existed = self.exists(&meta)?;
        self.del(&meta)?;
        self.del(&body_key(region, key))?;
        Ok(existed)
    }

    async fn keys(&self, region: &str) -> CacheResult<Vec<String>> {
        let prefix = meta_prefix(region);
        let mut keys: Vec<String> = self
            .all_keys()?
            .iter()
            .filter_map(|k| k.strip_prefix(prefix.as_str()).and_then(decode))
            .collect();
        keys.sort();
        Ok(keys)
    }
}
