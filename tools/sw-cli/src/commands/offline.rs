//! Fill the cache for offline use.

use anyhow::{Context as _, Result};

use crate::context::Context;

/// Run the offline command.
pub async fn run(ctx: &Context) -> Result<()> {
    let worker = ctx.worker()?;
    ctx.output.header("Offline fill");

    let spinner = ctx.output.spinner("Fetching resources missing from the cache");
    let result = worker.download_offline().await;
    spinner.finish_and_clear();
    let added = result.context("Offline fill failed; nothing was added")?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "added": added }));
        return Ok(());
    }

    if added.is_empty() {
        ctx.output.info("Every manifest resource is already cached");
    } else {
        ctx.output.success(&format!("Added {} resources", added.len()));
        for key in &added {
            ctx.output.list_item(key);
        }
    }
    Ok(())
}
