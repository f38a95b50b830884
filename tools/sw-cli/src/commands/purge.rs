//! Delete every cache region the worker owns.

use anyhow::Result;
use dialoguer::Confirm;
use sw_cache::CacheStorage;

use super::PurgeArgs;
use crate::context::Context;

/// Run the purge command.
pub async fn run(args: PurgeArgs, ctx: &Context) -> Result<()> {
    let config = ctx.worker_config()?;
    let storage = ctx.storage();

    if !args.yes {
        ctx.output.warn(&format!(
            "This deletes the regions {} under {}",
            config.regions.all().join(", "),
            ctx.storage_dir().display()
        ));
        let confirmed = Confirm::new()
            .with_prompt("Purge the asset cache?")
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.warn("Purge cancelled");
            return Ok(());
        }
    }

    let mut deleted = Vec::new();
    for region in config.regions.all() {
        if storage.delete(region).await? {
            deleted.push(region.to_string());
        }
    }

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "deleted": deleted }));
    } else if deleted.is_empty() {
        ctx.output.info("Nothing to purge");
    } else {
        ctx.output
            .success(&format!("Deleted {} regions: {}", deleted.len(), deleted.join(", ")));
    }
    Ok(())
}
