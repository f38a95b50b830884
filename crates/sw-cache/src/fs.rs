//! Directory-backed cache storage.
//!
//! Layout: one directory per region under the root, one `<key>.json`
//! metadata file and one `<key>.body` file per entry. Region names and keys
//! are encoded as unpadded URL-safe base64 so any URL maps to a valid file
//! name. The metadata file is written last, so an entry exists exactly when
//! its metadata file does.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sw_core::AssetResponse;
use tokio::fs;

use crate::error::{CacheError, CacheResult};
use crate::store::CacheStorage;

const META_EXT: &str = "json";
const BODY_EXT: &str = "body";

/// Cache storage persisted in a directory tree.
#[derive(Debug, Clone)]
pub struct FsCacheStorage {
    root: PathBuf,
}

impl FsCacheStorage {
    /// Use `root` as the storage directory. It is created on first open.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn region_dir(&self, region: &str) -> PathBuf {
        self.root.join(encode(region))
    }

    fn entry_path(&self, region: &str, key: &str, ext: &str) -> PathBuf {
        self.region_dir(region)
            .join(format!("{}.{}", encode(key), ext))
    }

    fn corrupt(region: &str, key: &str, reason: impl Into<String>) -> CacheError {
        CacheError::Corrupt {
            region: region.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

fn encode(name: &str) -> String {
    URL_SAFE_NO_PAD.encode(name.as_bytes())
}

fn decode(name: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(name).ok()?;
    String::from_utf8(bytes).ok()
}

async fn remove_file_if_exists(path: &Path) -> CacheResult<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

async fn is_dir(path: &Path) -> CacheResult<bool> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl CacheStorage for FsCacheStorage {
    async fn open(&self, region: &str) -> CacheResult<()> {
        fs::create_dir_all(self.region_dir(region)).await?;
        Ok(())
    }

    async fn has(&self, region: &str) -> CacheResult<bool> {
        is_dir(&self.region_dir(region)).await
    }

    async fn delete(&self, region: &str) -> CacheResult<bool> {
        match fs::remove_dir_all(self.region_dir(region)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn regions(&self) -> CacheResult<Vec<String>> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str().and_then(decode) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn match_entry(&self, region: &str, key: &str) -> CacheResult<Option<AssetResponse>> {
        let meta = match fs::read(self.entry_path(region, key, META_EXT)).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut response: AssetResponse = serde_json::from_slice(&meta)
            .map_err(|e| Self::corrupt(region, key, e.to_string()))?;
        response.body = match fs::read(self.entry_path(region, key, BODY_EXT)).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Self::corrupt(region, key, "body file missing"));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(response))
    }

    async fn put(&self, region: &str, key: &str, response: AssetResponse) -> CacheResult<()> {
        if !self.has(region).await? {
            return Err(CacheError::RegionMissing(region.to_string()));
        }

        let meta = serde_json::to_vec(&response)?;
        let meta_path = self.entry_path(region, key, META_EXT);
        let staged = meta_path.with_extension("json.tmp");

        fs::write(self.entry_path(region, key, BODY_EXT), &response.body).await?;
        fs::write(&staged, meta).await?;
        fs::rename(&staged, &meta_path).await?;

        tracing::trace!(region, key, bytes = response.body.len(), "stored cache entry");
        Ok(())
    }

    async fn remove(&self, region: &str, key: &str) -> CacheResult<bool> {
        let existed = remove_file_if_exists(&self.entry_path(region, key, META_EXT)).await?;
        remove_file_if_exists(&self.entry_path(region, key, BODY_EXT)).await?;
        Ok(existed)
    }

    async fn keys(&self, region: &str) -> CacheResult<Vec<String>> {
        let mut dir = match fs::read_dir(self.region_dir(region)).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            if let Some(key) = decode(stem) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> (tempfile::TempDir, FsCacheStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsCacheStorage::new(dir.path().join("cache"));
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let (_dir, storage) = storage();
        storage.open("app-cache").await.unwrap();

        let resp = AssetResponse::ok(b"console.log(1)".to_vec())
            .with_header("content-type", "text/javascript");
        storage
            .put("app-cache", "https://example.com/main.js?v=1", resp.clone())
            .await
            .unwrap();

        let found = storage
            .match_entry("app-cache", "https://example.com/main.js?v=1")
            .await
            .unwrap();
        assert_eq!(found, Some(resp));
        assert_eq!(
            storage.keys("app-cache").await.unwrap(),
            vec!["https://example.com/main.js?v=1"]
        );
    }

    #[tokio::test]
    async fn test_missing_root_reads_empty() {
        let (_dir, storage) = storage();
        assert!(storage.regions().await.unwrap().is_empty());
        assert!(storage.keys("x").await.unwrap().is_empty());
        assert!(storage.match_entry("x", "k").await.unwrap().is_none());
        assert!(!storage.has("x").await.unwrap());
        assert!(!storage.delete("x").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_requires_open_region() {
        let (_dir, storage) = storage();
        let err = storage.put("x", "k", AssetResponse::ok("v")).await.unwrap_err();
        assert!(matches!(err, CacheError::RegionMissing(_)));
    }

    #[tokio::test]
    async fn test_remove_and_delete() {
        let (_dir, storage) = storage();
        storage.open("a").await.unwrap();
        storage.open("b").await.unwrap();
        storage.put("a", "k1", AssetResponse::ok("1")).await.unwrap();
        storage.put("a", "k2", AssetResponse::ok("2")).await.unwrap();

        assert!(storage.remove("a", "k1").await.unwrap());
        assert!(!storage.remove("a", "k1").await.unwrap());
        assert_eq!(storage.keys("a").await.unwrap(), vec!["k2"]);
        assert_eq!(storage.regions().await.unwrap(), vec!["a", "b"]);

        assert!(storage.delete("a").await.unwrap());
        assert_eq!(storage.regions().await.unwrap(), vec!["b"]);
        assert!(storage.keys("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_body() {
        let (_dir, storage) = storage();
        storage.open("a").await.unwrap();
        storage.put("a", "k", AssetResponse::ok("old body")).await.unwrap();
        storage.put("a", "k", AssetResponse::ok("new")).await.unwrap();

        let found = storage.match_entry("a", "k").await.unwrap().unwrap();
        assert_eq!(found.bytes(), b"new");
    }

    #[tokio::test]
    async fn test_missing_body_is_corrupt() {
        let (_dir, storage) = storage();
        storage.open("a").await.unwrap();
        storage.put("a", "k", AssetResponse::ok("v")).await.unwrap();
        std::fs::remove_file(storage.entry_path("a", "k", BODY_EXT)).unwrap();

        let err = storage.match_entry("a", "k").await.unwrap_err();
        assert!(matches!(err, CacheError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let (dir, storage) = storage();
        storage.open("a").await.unwrap();
        storage.put("a", "k", AssetResponse::ok("v")).await.unwrap();

        let reopened = FsCacheStorage::new(dir.path().join("cache"));
        assert!(reopened.has("a").await.unwrap());
        assert!(reopened.match_entry("a", "k").await.unwrap().is_some());
    }
}
