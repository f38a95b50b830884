//! Serve one request through the worker.

use anyhow::{bail, Context as _, Result};
use serde::Serialize;
use sw_core::{AssetRequest, Method};

use super::FetchArgs;
use crate::context::Context;
use crate::output::{cache_badge, format_bytes};

#[derive(Serialize)]
struct FetchReport<'a> {
    url: &'a str,
    intercepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<usize>,
}

/// Run the fetch command.
pub async fn run(args: FetchArgs, ctx: &Context) -> Result<()> {
    let worker = ctx.worker()?;
    let Some(method) = Method::parse(&args.method) else {
        bail!("Unknown HTTP method '{}'", args.method);
    };

    let url = if args.path.starts_with("http://") || args.path.starts_with("https://") {
        args.path.clone()
    } else {
        worker.config().url_for(&args.path)
    };
    let request = AssetRequest::new(method, url.as_str());

    let served = worker
        .handle_fetch(&request)
        .await
        .with_context(|| format!("Fetch of {} failed", url))?;

    let Some(served) = served else {
        if ctx.output.is_json() {
            ctx.output.json(&FetchReport {
                url: &url,
                intercepted: false,
                key: None,
                status: None,
                cache: None,
                bytes: None,
            });
        }
        ctx.output
            .warn(&format!("{} {} is not handled by the worker", method, url));
        return Ok(());
    };

    if let Some(path) = &args.output {
        let path = ctx.resolve_path(path);
        std::fs::write(&path, served.response.bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        ctx.output.debug(&format!("Body written to {}", path.display()));
    }

    if ctx.output.is_json() {
        ctx.output.json(&FetchReport {
            url: &url,
            intercepted: true,
            key: Some(&served.key),
            status: Some(served.response.status),
            cache: Some(served.status.to_string()),
            bytes: Some(served.response.bytes().len()),
        });
        return Ok(());
    }

    ctx.output.success(&format!(
        "{} {} [{}]",
        served.response.status,
        url,
        cache_badge(served.status)
    ));
    ctx.output.kv("key", &served.key);
    ctx.output.kv(
        "size",
        &format_bytes(served.response.bytes().len() as u64),
    );
    if let Some(content_type) = served.response.content_type() {
        ctx.output.kv("content-type", content_type);
    }
    Ok(())
}
