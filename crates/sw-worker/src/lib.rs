//! Asset cache reconciler.
//!
//! `AssetWorker` owns three cache regions (content, temp staging, manifest
//! record) and exposes one entry point per lifecycle event:
//! - `install` - stage the core shell into the temp region
//! - `activate` - reconcile content against the previous manifest
//! - `handle_fetch` - serve manifest resources cache-first (root network-first)
//! - `handle_message` - `skipWaiting` / `downloadOffline`
//!
//! # Example
//!
//! ```ignore
//! use sw_cache::MemoryCacheStorage;
//! use sw_core::{AssetRequest, BuildManifest, WorkerConfig};
//! use sw_worker::{AssetWorker, DetachedHost};
//!
//! let worker = AssetWorker::new(config, build, MemoryCacheStorage::new(), fetcher, DetachedHost);
//! worker.install().await?;
//! worker.activate().await;
//! let served = worker.handle_fetch(&AssetRequest::get("https://app.example.com/main.dart.js")).await?;
//! ```

mod error;
mod host;
mod message;
mod outcome;
mod worker;

pub use error::*;
pub use host::*;
pub use message::*;
pub use outcome::*;
pub use worker::*;
