//! Core data model for the shellcache asset worker.
//!
//! This crate provides the fundamental types:
//! - `ResourceManifest` / `CoreShell` / `BuildManifest` - Build-time asset tables
//! - `ManifestDiff` - Key-level comparison of two manifests
//! - `WorkerConfig` - Origin and cache region names
//! - `AssetRequest` / `AssetResponse` - Request identity and cached blobs
//! - Logical key derivation (`content_key`, `request_key`)
//! - `WorkerEvent` - Lifecycle events the worker reacts to

mod config;
mod key;
mod lifecycle;
mod manifest;
mod request;
mod response;

pub use config::*;
pub use key::*;
pub use lifecycle::*;
pub use manifest::*;
pub use request::*;
pub use response::*;
