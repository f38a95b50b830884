//! The cache reconciler.

use std::collections::HashSet;

use futures::lock::Mutex;
use sw_cache::{CacheRegion, CacheStorage};
use sw_core::{
    content_key, is_root, request_key, AssetRequest, AssetResponse, BuildManifest, CacheMode,
    ResourceManifest, WorkerConfig, WorkerEvent,
};
use sw_fetch::{fetch_all, Fetcher};
use sw_observability::{LogFormat, WorkerLogger};

use crate::error::WorkerError;
use crate::host::ClientHost;
use crate::message::WorkerMessage;
use crate::outcome::{ActivationOutcome, CacheStatus, FetchOutcome};

/// Logical key under which the manifest record is stored.
pub const MANIFEST_RECORD_KEY: &str = "manifest";

/// Asset caching worker for one deployed build.
///
/// Holds no cache state of its own; everything lives in the injected
/// storage. Activation is serialised per instance: a second concurrent
/// `activate` waits for the first to finish.
pub struct AssetWorker<S, F, H> {
    config: WorkerConfig,
    build: BuildManifest,
    storage: S,
    fetcher: F,
    host: H,
    activation: Mutex<()>,
    log_format: LogFormat,
}

impl<S, F, H> AssetWorker<S, F, H>
where
    S: CacheStorage,
    F: Fetcher,
    H: ClientHost,
{
    /// Create a worker for `build`, served under `config.origin`.
    pub fn new(config: WorkerConfig, build: BuildManifest, storage: S, fetcher: F, host: H) -> Self {
        Self {
            config,
            build,
            storage,
            fetcher,
            host,
            activation: Mutex::new(()),
            log_format: LogFormat::default(),
        }
    }

    /// Set the log output format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// The worker configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// The build this worker serves.
    pub fn build(&self) -> &BuildManifest {
        &self.build
    }

    /// The injected cache storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn logger(&self, event: WorkerEvent) -> WorkerLogger {
        WorkerLogger::new(event).with_format(self.log_format)
    }

    fn manifest_record_url(&self) -> String {
        self.config.url_for(MANIFEST_RECORD_KEY)
    }

    /// Stage the core shell into the temp region.
    ///
    /// Requests the host to skip waiting, then fetches every core shell
    /// resource bypassing HTTP caches. All fetches must succeed with a 2xx
    /// status or nothing is stored and the failure is returned. Returns the
    /// staged request URLs.
    pub async fn install(&self) -> Result<Vec<String>, WorkerError> {
        let log = self.logger(WorkerEvent::Install);
        log.debug_builder("staging core shell")
            .field_u64("count", self.build.core.len() as u64)
            .emit();
        self.host.skip_waiting();

        // Staging holds only this build's core shell.
        self.storage.delete(&self.config.regions.temp).await?;
        let temp = CacheRegion::open(&self.storage, &self.config.regions.temp).await?;
        let requests: Vec<AssetRequest> = self
            .build
            .core
            .iter()
            .map(|key| {
                AssetRequest::get(self.config.url_for(key)).with_cache_mode(CacheMode::Reload)
            })
            .collect();

        let fetched = match fetch_all(&self.fetcher, requests).await {
            Ok(fetched) => fetched,
            Err(e) => {
                log.error_builder("core shell fetch failed")
                    .field("error", e.to_string())
                    .emit();
                return Err(e.into());
            }
        };

        let mut staged = Vec::with_capacity(fetched.len());
        for (request, response) in fetched {
            temp.put(&request.url, response).await?;
            staged.push(request.url);
        }

        log.info_builder("core shell staged")
            .field_u64("count", staged.len() as u64)
            .emit();
        Ok(staged)
    }

    /// Promote the staged shell into the content region.
    ///
    /// Never fails: if reconciliation errors, all three regions are deleted
    /// so the next activation starts from empty, and
    /// [`ActivationOutcome::Reset`] is returned.
    pub async fn activate(&self) -> ActivationOutcome {
        let _guard = self.activation.lock().await;
        let log = self.logger(WorkerEvent::Activate);

        match self.reconcile().await {
            Ok(outcome) => {
                match &outcome {
                    ActivationOutcome::Fresh { copied } => log
                        .info_builder("content rebuilt from staged shell")
                        .field_u64("copied", copied.len() as u64)
                        .emit(),
                    ActivationOutcome::Upgraded {
                        evicted,
                        retained,
                        copied,
                    } => log
                        .info_builder("content reconciled")
                        .field_u64("evicted", evicted.len() as u64)
                        .field_u64("retained", retained.len() as u64)
                        .field_u64("copied", copied.len() as u64)
                        .emit(),
                    ActivationOutcome::Reset { .. } => {}
                }
                outcome
            }
            Err(e) => {
                log.error_builder("Failed to upgrade asset cache")
                    .field("error", e.to_string())
                    .emit();
                self.reset(&log).await;
                ActivationOutcome::Reset {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn reconcile(&self) -> Result<ActivationOutcome, WorkerError> {
        let regions = &self.config.regions;
        let content = CacheRegion::open(&self.storage, &regions.content).await?;
        let temp = CacheRegion::open(&self.storage, &regions.temp).await?;
        let record = CacheRegion::open(&self.storage, &regions.manifest).await?;

        let Some(previous) = self.read_manifest_record(&record).await? else {
            self.storage.delete(&regions.content).await?;
            let content = CacheRegion::open(&self.storage, &regions.content).await?;
            let copied = content.copy_from(&temp).await?;
            self.storage.delete(&regions.temp).await?;
            self.write_manifest_record(&record).await?;
            self.host.claim_clients();
            return Ok(ActivationOutcome::Fresh { copied });
        };

        let mut evicted = Vec::new();
        let mut retained = Vec::new();
        for url in content.keys().await? {
            let reusable = content_key(&self.config.origin, &url)
                .map(|key| self.build.resources.is_unchanged_since(&previous, &key))
                .unwrap_or(false);
            if reusable {
                retained.push(url);
            } else {
                content.remove(&url).await?;
                evicted.push(url);
            }
        }

        let copied = content.copy_from(&temp).await?;
        self.storage.delete(&regions.temp).await?;
        self.write_manifest_record(&record).await?;
        self.host.claim_clients();

        Ok(ActivationOutcome::Upgraded {
            evicted,
            retained,
            copied,
        })
    }

    async fn reset(&self, log: &WorkerLogger) {
        for region in self.config.regions.all() {
            if let Err(e) = self.storage.delete(region).await {
                log.error_builder("failed to delete cache region")
                    .field("region", region)
                    .field("error", e.to_string())
                    .emit();
            }
        }
    }

    async fn read_manifest_record(
        &self,
        record: &CacheRegion<'_, S>,
    ) -> Result<Option<ResourceManifest>, WorkerError> {
        match record.match_entry(&self.manifest_record_url()).await? {
            Some(response) => Ok(Some(ResourceManifest::from_json(response.bytes())?)),
            None => Ok(None),
        }
    }

    async fn write_manifest_record(&self, record: &CacheRegion<'_, S>) -> Result<(), WorkerError> {
        let body = self.build.resources.to_json();
        record
            .put(&self.manifest_record_url(), AssetResponse::json(body))
            .await?;
        Ok(())
    }

    /// The manifest recorded by the last successful activation, if any.
    pub async fn recorded_manifest(&self) -> Result<Option<ResourceManifest>, WorkerError> {
        if !self.storage.has(&self.config.regions.manifest).await? {
            return Ok(None);
        }
        let record = CacheRegion::open(&self.storage, &self.config.regions.manifest).await?;
        self.read_manifest_record(&record).await
    }

    /// Serve an intercepted request.
    ///
    /// Returns `Ok(None)` when the request is not intercepted: non-GET
    /// methods, URLs outside the origin, and keys absent from the manifest.
    /// The root key is served network-first; every other manifest key
    /// cache-first with lazy fill.
    pub async fn handle_fetch(
        &self,
        request: &AssetRequest,
    ) -> Result<Option<FetchOutcome>, WorkerError> {
        if !request.is_get() {
            return Ok(None);
        }
        let Some(key) = request_key(&self.config.origin, &request.url) else {
            return Ok(None);
        };
        if !self.build.resources.contains(&key) {
            return Ok(None);
        }

        let log = self.logger(WorkerEvent::Fetch).with_key(key.as_str());
        let cache_url = self.config.url_for(&key);

        let outcome = if is_root(&key) {
            self.network_first(request, key, &cache_url, &log).await?
        } else {
            self.cache_first(request, key, &cache_url, &log).await?
        };

        log.debug_builder("served")
            .field("status", outcome.status.to_string())
            .field_u64("http_status", outcome.response.status as u64)
            .emit();
        Ok(Some(outcome))
    }

    async fn cache_first(
        &self,
        request: &AssetRequest,
        key: String,
        cache_url: &str,
        log: &WorkerLogger,
    ) -> Result<FetchOutcome, WorkerError> {
        let content = CacheRegion::open(&self.storage, &self.config.regions.content).await?;
        if let Some(cached) = content.match_entry(cache_url).await? {
            return Ok(FetchOutcome::new(key, cached, CacheStatus::Hit));
        }

        let response = self.fetcher.fetch(request).await?;
        if !response.is_success() {
            return Ok(FetchOutcome::new(key, response, CacheStatus::Bypass));
        }

        // A failed fill must not fail the response.
        if let Err(e) = content.put(cache_url, response.clone()).await {
            log.warn_builder("lazy cache fill failed")
                .field("error", e.to_string())
                .emit();
        }
        Ok(FetchOutcome::new(key, response, CacheStatus::Miss))
    }

    async fn network_first(
        &self,
        request: &AssetRequest,
        key: String,
        cache_url: &str,
        log: &WorkerLogger,
    ) -> Result<FetchOutcome, WorkerError> {
        let content = CacheRegion::open(&self.storage, &self.config.regions.content).await?;

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if let Err(e) = content.put(cache_url, response.clone()).await {
                    log.warn_builder("entry document cache update failed")
                        .field("error", e.to_string())
                        .emit();
                }
                Ok(FetchOutcome::new(key, response, CacheStatus::Network))
            }
            Err(error) => match content.match_entry(cache_url).await? {
                Some(cached) => {
                    log.warn_builder("network unavailable, serving cached entry document")
                        .field("error", error.to_string())
                        .emit();
                    Ok(FetchOutcome::new(key, cached, CacheStatus::Fallback))
                }
                None => Err(error.into()),
            },
        }
    }

    /// Dispatch a client message.
    ///
    /// Returns the recognized message, or `None` for payloads that are
    /// ignored.
    pub async fn handle_message(
        &self,
        payload: &str,
    ) -> Result<Option<WorkerMessage>, WorkerError> {
        let Some(message) = WorkerMessage::parse(payload) else {
            self.logger(WorkerEvent::Message)
                .debug_builder("ignored message")
                .field("payload", payload)
                .emit();
            return Ok(None);
        };

        match message {
            WorkerMessage::SkipWaiting => self.host.skip_waiting(),
            WorkerMessage::DownloadOffline => {
                self.download_offline().await?;
            }
        }
        Ok(Some(message))
    }

    /// Fetch and store every manifest resource missing from the content region.
    ///
    /// All-or-nothing: any failed or non-2xx fetch aborts the whole batch
    /// with nothing stored. Returns the logical keys that were added.
    pub async fn download_offline(&self) -> Result<Vec<String>, WorkerError> {
        let log = self.logger(WorkerEvent::Message);
        let content = CacheRegion::open(&self.storage, &self.config.regions.content).await?;

        let present: HashSet<String> = content
            .keys()
            .await?
            .iter()
            .filter_map(|url| content_key(&self.config.origin, url))
            .collect();
        let missing: Vec<String> = self
            .build
            .resources
            .keys()
            .filter(|key| !present.contains(*key))
            .map(String::from)
            .collect();

        if missing.is_empty() {
            log.debug("offline fill: nothing missing");
            return Ok(missing);
        }

        let requests = missing
            .iter()
            .map(|key| AssetRequest::get(self.config.url_for(key)))
            .collect();
        let fetched = match fetch_all(&self.fetcher, requests).await {
            Ok(fetched) => fetched,
            Err(e) => {
                log.warn_builder("offline fill aborted")
                    .field_u64("requested", missing.len() as u64)
                    .field("error", e.to_string())
                    .emit();
                return Err(e.into());
            }
        };

        for (request, response) in fetched {
            content.put(&request.url, response).await?;
        }

        log.info_builder("offline fill complete")
            .field_u64("added", missing.len() as u64)
            .emit();
        Ok(missing)
    }
}
