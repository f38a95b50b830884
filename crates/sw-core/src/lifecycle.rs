//! Worker lifecycle events.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Events the worker reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerEvent {
    /// A new worker version is being installed.
    Install,
    /// The installed version takes over.
    Activate,
    /// A request from a controlled client.
    Fetch,
    /// A message posted by a client.
    Message,
}

impl WorkerEvent {
    /// Get the name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Fetch => "fetch",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for WorkerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier correlating the log lines of one event dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventId(pub String);

static NEXT_EVENT: AtomicU64 = AtomicU64::new(1);

impl EventId {
    /// Allocate the next id for an event kind, e.g. `fetch-17`.
    pub fn next(event: WorkerEvent) -> Self {
        let seq = NEXT_EVENT.fetch_add(1, Ordering::Relaxed);
        Self(format!("{}-{}", event.name(), seq))
    }

    /// Get the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ids_are_unique_and_prefixed() {
        let a = EventId::next(WorkerEvent::Fetch);
        let b = EventId::next(WorkerEvent::Fetch);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("fetch-"));
        assert!(EventId::next(WorkerEvent::Activate).to_string().starts_with("activate-"));
    }
}
