//! Client registry primitives supplied by the host.

use std::sync::Arc;

/// Host operations on the worker's clients and lifecycle.
pub trait ClientHost: Send + Sync {
    /// Let a waiting worker version activate without waiting for clients to close.
    fn skip_waiting(&self);

    /// Take control of already-open clients.
    fn claim_clients(&self);
}

impl<H: ClientHost + ?Sized> ClientHost for Arc<H> {
    fn skip_waiting(&self) {
        (**self).skip_waiting()
    }

    fn claim_clients(&self) {
        (**self).claim_clients()
    }
}

/// Host with no client registry (headless runs, tools).
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedHost;

impl ClientHost for DetachedHost {
    fn skip_waiting(&self) {
        tracing::debug!("skip waiting requested; no waiting instance to promote");
    }

    fn claim_clients(&self) {
        tracing::debug!("claim requested; no clients attached");
    }
}
