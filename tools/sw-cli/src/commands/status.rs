//! Show cache regions and how the recorded build differs from the current one.

use std::collections::HashSet;

use anyhow::Result;
use serde::Serialize;
use sw_cache::CacheStorage;
use sw_core::{content_key, ManifestDiff};

use crate::context::Context;

#[derive(Serialize)]
struct RegionStatus {
    role: &'static str,
    name: String,
    present: bool,
    entries: usize,
}

#[derive(Serialize)]
struct StatusReport {
    origin: String,
    storage: String,
    regions: Vec<RegionStatus>,
    manifest_resources: usize,
    cached_resources: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    diff: Option<ManifestDiff>,
}

/// Run the status command.
pub async fn run(ctx: &Context) -> Result<()> {
    let worker = ctx.worker()?;
    let storage = worker.storage();
    let regions = &worker.config().regions;

    let mut region_status = Vec::new();
    for (role, name) in [
        ("content", &regions.content),
        ("temp", &regions.temp),
        ("manifest", &regions.manifest),
    ] {
        let present = storage.has(name).await?;
        let entries = if present { storage.keys(name).await?.len() } else { 0 };
        region_status.push(RegionStatus {
            role,
            name: name.clone(),
            present,
            entries,
        });
    }

    let origin = &worker.config().origin;
    let cached: HashSet<String> = storage
        .keys(&regions.content)
        .await?
        .iter()
        .filter_map(|url| content_key(origin, url))
        .collect();
    let current = &worker.build().resources;
    let cached_resources = current.keys().filter(|k| cached.contains(*k)).count();

    let diff = worker
        .recorded_manifest()
        .await?
        .map(|recorded| ManifestDiff::between(&recorded, current));
    let evictions = diff
        .as_ref()
        .map(|diff| pending_evictions(diff, &cached))
        .unwrap_or_default();

    let report = StatusReport {
        origin: origin.clone(),
        storage: ctx.storage_dir().display().to_string(),
        regions: region_status,
        manifest_resources: current.len(),
        cached_resources,
        diff,
    };

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    ctx.output.header("Asset cache status");
    ctx.output.kv("origin", &report.origin);
    ctx.output.kv("storage", &report.storage);
    ctx.output.kv(
        "cached",
        &format!(
            "{}/{} manifest resources",
            report.cached_resources, report.manifest_resources
        ),
    );

    ctx.output.header("Regions");
    ctx.output.table_row(&["ROLE", "NAME", "ENTRIES"], &[10, 20, 8]);
    for region in &report.regions {
        let entries = if region.present {
            region.entries.to_string()
        } else {
            "-".to_string()
        };
        ctx.output
            .table_row(&[region.role, region.name.as_str(), entries.as_str()], &[10, 20, 8]);
    }

    ctx.output.header("Build");
    match &report.diff {
        None => ctx.output.info("No build recorded yet; the next activation starts fresh"),
        Some(diff) if diff.is_empty() => ctx.output.success("Recorded build matches the current manifest"),
        Some(diff) => {
            ctx.output.warn("Current manifest differs from the recorded build");
            ctx.output.kv("added", &diff.added.len().to_string());
            ctx.output.kv("changed", &diff.changed.len().to_string());
            ctx.output.kv("removed", &diff.removed.len().to_string());
            ctx.output.kv("unchanged", &diff.unchanged.len().to_string());
            if ctx.output.is_verbose() {
                for key in &evictions {
                    ctx.output.list_item(&format!("evict on activation: {}", key));
                }
            }
        }
    }
    Ok(())
}

/// Changed or removed keys that are actually cached and so will be evicted.
fn pending_evictions(diff: &ManifestDiff, cached: &HashSet<String>) -> Vec<String> {
    diff.changed
        .iter()
        .chain(&diff.removed)
        .filter(|key| cached.contains(*key))
        .cloned()
        .collect()
}
