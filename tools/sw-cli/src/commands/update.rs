//! Install then activate in one step.

use anyhow::{Context as _, Result};

use super::{activate, install, UpdateArgs};
use crate::context::Context;

/// Run the update command.
pub async fn run(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let worker = ctx.worker()?;
    let total = if args.offline { 3 } else { 2 };
    ctx.output.header("Update");

    ctx.output.step(1, total, "Staging core shell");
    install::stage(&worker, ctx).await?;

    ctx.output.step(2, total, "Activating");
    let outcome = worker.activate().await;
    activate::report(&outcome, ctx)?;

    if args.offline {
        ctx.output.step(3, total, "Filling cache for offline use");
        let added = worker
            .download_offline()
            .await
            .context("Offline fill failed; nothing was added")?;
        ctx.output.success(&format!("Added {} resources", added.len()));
    }
    Ok(())
}
