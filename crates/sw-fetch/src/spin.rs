//! Outbound HTTP through the Spin host.

use std::collections::BTreeMap;

use async_trait::async_trait;
use spin_sdk::http::{Method as SpinMethod, Request, Response};
use sw_core::{AssetRequest, AssetResponse, CacheMode, Method};

use crate::client::Fetcher;
use crate::error::FetchError;

/// Fetcher using Spin's outbound HTTP.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinFetcher;

impl SpinFetcher {
    pub fn new() -> Self {
        Self
    }
}

fn spin_method(method: Method) -> SpinMethod {
    match method {
        Method::Get => SpinMethod::Get,
        Method::Post => SpinMethod::Post,
        Method::Put => SpinMethod::Put,
        Method::Patch => SpinMethod::Patch,
        Method::Delete => SpinMethod::Delete,
        Method::Head => SpinMethod::Head,
        Method::Options => SpinMethod::Options,
    }
}

#[async_trait]
impl Fetcher for SpinFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        let mut builder = Request::builder();
        builder.method(spin_method(request.method));
        builder.uri(request.url.as_str());
        for (key, value) in &request.headers {
            builder.header(key.as_str(), value.as_str());
        }
        if request.cache == CacheMode::Reload {
            builder.header("cache-control", "no-cache");
            builder.header("pragma", "no-cache");
        }

        let response: Response = spin_sdk::http::send(builder.build())
            .await
            .map_err(|e| FetchError::request(&request.url, e.to_string()))?;

        let status = *response.status();
        let headers: BTreeMap<String, String> = response
            .headers()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.to_string(), v.to_string())))
            .collect();

        Ok(AssetResponse::new(status, headers, response.into_body()))
    }
}
