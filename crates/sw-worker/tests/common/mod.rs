//! Shared fixtures for worker integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sw_cache::{CacheError, CacheResult, CacheStorage, MemoryCacheStorage};
use sw_core::{
    AssetRequest, AssetResponse, BuildManifest, CacheMode, CoreShell, ResourceManifest,
    WorkerConfig,
};
use sw_fetch::{FetchError, Fetcher};
use sw_worker::{AssetWorker, ClientHost};

pub const ORIGIN: &str = "https://app.example.com";

pub fn url(key: &str) -> String {
    config().url_for(key)
}

pub fn config() -> WorkerConfig {
    WorkerConfig::new(ORIGIN)
}

/// Build manifest from `(key, hash)` pairs and a core shell.
pub fn build(resources: &[(&str, &str)], core: &[&str]) -> BuildManifest {
    let resources: ResourceManifest = resources
        .iter()
        .map(|(k, h)| (k.to_string(), h.to_string()))
        .collect();
    BuildManifest::new(resources, CoreShell::new(core.iter().copied()))
}

/// Fetcher serving scripted bodies by URL.
///
/// URLs without a script fail at the transport level, as do URLs marked
/// offline. Every request is recorded with its cache mode.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, (u16, String)>>,
    offline: Mutex<Vec<String>>,
    seen: Mutex<Vec<(String, CacheMode)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, key: &str, body: &str) -> &Self {
        self.serve_status(key, 200, body)
    }

    pub fn serve_status(&self, key: &str, status: u16, body: &str) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url(key), (status, body.to_string()));
        self
    }

    pub fn take_offline(&self, key: &str) {
        self.offline.lock().unwrap().push(url(key));
    }

    pub fn bring_online(&self) {
        self.offline.lock().unwrap().clear();
    }

    pub fn requests(&self) -> Vec<(String, CacheMode)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn clear_requests(&self) {
        self.seen.lock().unwrap().clear();
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        self.seen
            .lock()
            .unwrap()
            .push((request.url.clone(), request.cache));

        if self.offline.lock().unwrap().contains(&request.url) {
            return Err(FetchError::request(&request.url, "network unreachable"));
        }
        match self.routes.lock().unwrap().get(&request.url) {
            Some((status, body)) => Ok(AssetResponse::new(
                *status,
                Default::default(),
                body.clone().into_bytes(),
            )),
            None => Err(FetchError::request(&request.url, "connection refused")),
        }
    }
}

/// Host that counts lifecycle calls.
#[derive(Default)]
pub struct RecordingHost {
    pub skipped: AtomicUsize,
    pub claimed: AtomicUsize,
}

impl RecordingHost {
    pub fn skip_count(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    pub fn claim_count(&self) -> usize {
        self.claimed.load(Ordering::SeqCst)
    }
}

impl ClientHost for RecordingHost {
    fn skip_waiting(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn claim_clients(&self) {
        self.claimed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Memory storage that can be told to fail writes to one region.
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryCacheStorage,
    fail_puts_to: Mutex<Option<String>>,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_puts_to(&self, region: &str) {
        *self.fail_puts_to.lock().unwrap() = Some(region.to_string());
    }

    pub fn heal(&self) {
        *self.fail_puts_to.lock().unwrap() = None;
    }
}

#[async_trait]
impl CacheStorage for FlakyStorage {
    async fn open(&self, region: &str) -> CacheResult<()> {
        self.inner.open(region).await
    }

    async fn has(&self, region: &str) -> CacheResult<bool> {
        self.inner.has(region).await
    }

    async fn delete(&self, region: &str) -> CacheResult<bool> {
        self.inner.delete(region).await
    }

    async fn regions(&self) -> CacheResult<Vec<String>> {
        self.inner.regions().await
    }

    async fn match_entry(&self, region: &str, key: &str) -> CacheResult<Option<AssetResponse>> {
        self.inner.match_entry(region, key).await
    }

    async fn put(&self, region: &str, key: &str, response: AssetResponse) -> CacheResult<()> {
        if self.fail_puts_to.lock().unwrap().as_deref() == Some(region) {
            return Err(CacheError::StoreError(format!("quota exceeded in {}", region)));
        }
        self.inner.put(region, key, response).await
    }

    async fn remove(&self, region: &str, key: &str) -> CacheResult<bool> {
        self.inner.remove(region, key).await
    }

    async fn keys(&self, region: &str) -> CacheResult<Vec<String>> {
        self.inner.keys(region).await
    }
}

pub type TestWorker<S> = AssetWorker<Arc<S>, Arc<ScriptedFetcher>, Arc<RecordingHost>>;

pub struct Harness<S> {
    pub storage: Arc<S>,
    pub fetcher: Arc<ScriptedFetcher>,
    pub host: Arc<RecordingHost>,
}

impl<S: CacheStorage + Default> Harness<S> {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(S::default()),
            fetcher: Arc::new(ScriptedFetcher::new()),
            host: Arc::new(RecordingHost::default()),
        }
    }

    /// A worker for `build` sharing this harness's storage, network and host.
    pub fn worker(&self, build: BuildManifest) -> TestWorker<S> {
        AssetWorker::new(
            config(),
            build,
            self.storage.clone(),
            self.fetcher.clone(),
            self.host.clone(),
        )
    }

    pub async fn body(&self, region: &str, key: &str) -> Option<String> {
        self.storage
            .match_entry(region, &url(key))
            .await
            .unwrap()
            .map(|r| String::from_utf8(r.body).unwrap())
    }

    pub async fn keys(&self, region: &str) -> Vec<String> {
        self.storage.keys(region).await.unwrap()
    }
}
