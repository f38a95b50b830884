//! Structured logging for the shellcache asset worker.
//!
//! This crate provides:
//! - `WorkerLogger` - Event-scoped structured logger emitting through `tracing`
//! - `LogBuilder` - Fluent construction of entries with extra fields
//! - `LogFormat` / `LogLevel` - Output format and severity

mod logging;

pub use logging::*;

// Re-export event identity from sw-core for convenience
pub use sw_core::{EventId, WorkerEvent};
