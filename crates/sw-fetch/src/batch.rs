//! All-or-nothing batch fetch.

use futures::future::try_join_all;
use sw_core::{AssetRequest, AssetResponse};

use crate::client::{fetch_ok, Fetcher};
use crate::error::FetchError;

/// Fetch every request concurrently, requiring a 2xx response for each.
///
/// Either all responses are returned, paired with their requests in input
/// order, or the first failure is. No partial results are exposed, so a
/// caller that only stores on `Ok` never persists part of a batch.
pub async fn fetch_all<F: Fetcher + ?Sized>(
    fetcher: &F,
    requests: Vec<AssetRequest>,
) -> Result<Vec<(AssetRequest, AssetResponse)>, FetchError> {
    let count = requests.len();
    let results = try_join_all(requests.into_iter().map(|request| async move {
        let response = fetch_ok(fetcher, &request).await?;
        Ok::<_, FetchError>((request, response))
    }))
    .await;

    match &results {
        Ok(_) => tracing::debug!(count, "batch fetch complete"),
        Err(e) => tracing::debug!(count, error = %e, "batch fetch aborted"),
    }
    results
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Serves canned statuses by URL; unknown URLs fail at the transport level.
    struct CannedFetcher {
        statuses: HashMap<String, u16>,
        seen: Mutex<Vec<String>>,
    }

    impl CannedFetcher {
        fn new(statuses: &[(&str, u16)]) -> Self {
            Self {
                statuses: statuses
                    .iter()
                    .map(|(u, s)| (u.to_string(), *s))
                    .collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
            self.seen.lock().unwrap().push(request.url.clone());
            match self.statuses.get(&request.url) {
                Some(status) => Ok(AssetResponse::new(
                    *status,
                    Default::default(),
                    request.url.clone().into_bytes(),
                )),
                None => Err(FetchError::request(&request.url, "connection refused")),
            }
        }
    }

    #[tokio::test]
    async fn test_all_succeed_in_order() {
        let fetcher = CannedFetcher::new(&[("a", 200), ("b", 204)]);
        let results = fetch_all(
            &fetcher,
            vec![AssetRequest::get("a"), AssetRequest::get("b")],
        )
        .await
        .unwrap();

        let urls: Vec<_> = results.iter().map(|(req, _)| req.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b"]);
        assert_eq!(results[1].1.status, 204);
    }

    #[tokio::test]
    async fn test_non_ok_status_aborts_batch() {
        let fetcher = CannedFetcher::new(&[("a", 200), ("b", 404)]);
        let err = fetch_all(
            &fetcher,
            vec![AssetRequest::get("a"), AssetRequest::get("b")],
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            FetchError::Http {
                status: 404,
                url: "b".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_batch() {
        let fetcher = CannedFetcher::new(&[("a", 200)]);
        let err = fetch_all(
            &fetcher,
            vec![AssetRequest::get("a"), AssetRequest::get("missing")],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FetchError::Request { .. }));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let fetcher = CannedFetcher::new(&[]);
        assert!(fetch_all(&fetcher, Vec::new()).await.unwrap().is_empty());
        assert!(fetcher.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_ok_passes_success_through() {
        let fetcher = CannedFetcher::new(&[("a", 200)]);
        let resp = fetch_ok(&fetcher, &AssetRequest::get("a")).await.unwrap();
        assert_eq!(resp.bytes(), b"a");
    }
}
