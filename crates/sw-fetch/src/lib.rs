//! Network fetch primitive for the shellcache asset worker.
//!
//! This crate provides:
//! - `Fetcher` - The host network fetch abstraction
//! - `FetchError` - Fetch failure kinds
//! - `fetch_all` - All-or-nothing batch fetch
//! - `SpinFetcher` - Outbound HTTP through Spin (wasm32)

mod batch;
mod client;
mod error;

#[cfg(target_arch = "wasm32")]
mod spin;

pub use batch::*;
pub use client::*;
pub use error::*;

#[cfg(target_arch = "wasm32")]
pub use spin::SpinFetcher;
