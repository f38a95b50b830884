//! Named cache regions for the shellcache asset worker.
//!
//! This crate provides:
//! - `CacheStorage` - The host cache abstraction (regions of request -> response)
//! - `CacheRegion` - A handle scoped to one opened region
//! - `MemoryCacheStorage` - In-process storage for tests and embedding
//! - `FsCacheStorage` - Directory-backed storage (native targets)
//! - `KvCacheStorage` - Spin key-value backed storage (wasm32)
//!
//! # Example
//!
//! ```ignore
//! use sw_cache::{CacheRegion, MemoryCacheStorage};
//! use sw_core::AssetResponse;
//!
//! let storage = MemoryCacheStorage::new();
//! let content = CacheRegion::open(&storage, "app-cache").await?;
//! content.put("https://example.com/main.js", AssetResponse::ok("...")).await?;
//! assert!(content.match_entry("https://example.com/main.js").await?.is_some());
//! ```

mod error;
mod memory;
mod store;

#[cfg(not(target_arch = "wasm32"))]
mod fs;
#[cfg(target_arch = "wasm32")]
mod kv;

pub use error::*;
pub use memory::*;
pub use store::*;

#[cfg(not(target_arch = "wasm32"))]
pub use fs::FsCacheStorage;
#[cfg(target_arch = "wasm32")]
pub use kv::KvCacheStorage;
