//! Stage the core shell.

use anyhow::{Context as _, Result};

use crate::context::{CliWorker, Context};

/// Run the install command.
pub async fn run(ctx: &Context) -> Result<()> {
    let worker = ctx.worker()?;
    ctx.output.header("Install");

    let staged = stage(&worker, ctx).await?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "staged": staged }));
    }
    Ok(())
}

/// Fetch the core shell into the temp region.
pub(crate) async fn stage(worker: &CliWorker, ctx: &Context) -> Result<Vec<String>> {
    let spinner = ctx.output.spinner(&format!(
        "Fetching {} core resources from {}",
        worker.build().core.len(),
        worker.config().origin
    ));
    let result = worker.install().await;
    spinner.finish_and_clear();

    let staged = result.context("Install failed; nothing was staged")?;
    ctx.output.success(&format!(
        "Staged {} core resources in '{}'",
        staged.len(),
        worker.config().regions.temp
    ));
    for url in &staged {
        ctx.output.debug(url);
    }
    Ok(staged)
}
