//! Results reported by the worker entry points.

use serde::Serialize;
use sw_core::AssetResponse;

/// How a fetched response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from the content region.
    Hit,
    /// Fetched from the network and stored.
    Miss,
    /// Fetched from the network, not stored (non-2xx).
    Bypass,
    /// Network-first: fresh network response, stored.
    Network,
    /// Network-first: network failed, served the cached copy.
    Fallback,
}

impl CacheStatus {
    /// Whether the response came from the cache.
    pub fn from_cache(&self) -> bool {
        matches!(self, Self::Hit | Self::Fallback)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Bypass => write!(f, "BYPASS"),
            Self::Network => write!(f, "NETWORK"),
            Self::Fallback => write!(f, "FALLBACK"),
        }
    }
}

/// A response produced by an intercepted fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Logical resource key the request resolved to.
    pub key: String,
    /// The response to hand back to the client.
    pub response: AssetResponse,
    /// How the response was produced.
    pub status: CacheStatus,
}

impl FetchOutcome {
    /// Create a fetch outcome.
    pub fn new(key: impl Into<String>, response: AssetResponse, status: CacheStatus) -> Self {
        Self {
            key: key.into(),
            response,
            status,
        }
    }
}

/// Result of an activation.
///
/// Lists hold request identities (absolute URLs) as stored in the content
/// region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ActivationOutcome {
    /// No manifest was recorded: content was rebuilt from the staged shell.
    Fresh {
        /// Entries copied from temp.
        copied: Vec<String>,
    },
    /// Content was reconciled against the recorded manifest.
    Upgraded {
        /// Entries deleted because their resource was removed or changed.
        evicted: Vec<String>,
        /// Entries kept because their hash is unchanged.
        retained: Vec<String>,
        /// Entries copied from temp (may overwrite retained ones).
        copied: Vec<String>,
    },
    /// Reconciliation failed; all three regions were deleted.
    Reset {
        /// The failure that triggered the reset.
        reason: String,
    },
}

impl ActivationOutcome {
    /// Whether activation left the cache consistent with the current manifest.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Reset { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_status_display() {
        assert_eq!(CacheStatus::Hit.to_string(), "HIT");
        assert_eq!(CacheStatus::Fallback.to_string(), "FALLBACK");
        assert!(CacheStatus::Fallback.from_cache());
        assert!(!CacheStatus::Network.from_cache());
    }

    #[test]
    fn test_activation_outcome_json() {
        let outcome = ActivationOutcome::Reset {
            reason: "boom".to_string(),
        };
        assert!(!outcome.is_success());
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            r#"{"kind":"reset","reason":"boom"}"#
        );
    }
}
