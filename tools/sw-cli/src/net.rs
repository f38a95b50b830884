//! Network fetcher backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use sw_core::{AssetRequest, AssetResponse, CacheMode, Method};
use sw_fetch::{FetchError, Fetcher};

/// Fetcher that performs real HTTP requests.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher with a pooled client. Requests carry no timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .build()?;
        Ok(Self { client })
    }

    fn build_request(&self, request: &AssetRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(reqwest_method(request.method), request.url.as_str());
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if request.cache == CacheMode::Reload {
            builder = builder
                .header(reqwest::header::CACHE_CONTROL, "no-cache")
                .header(reqwest::header::PRAGMA, "no-cache");
        }
        builder
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn to_fetch_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_builder() {
        FetchError::InvalidUrl(url.to_string())
    } else {
        FetchError::request(url, error.to_string())
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(|e| to_fetch_error(&request.url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| to_fetch_error(&request.url, e))?;

        tracing::debug!(url = %request.url, status, bytes = body.len(), "fetched");
        Ok(AssetResponse::new(status, headers, body.to_vec()))
    }
}
