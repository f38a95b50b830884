//! Promote the staged shell.

use anyhow::{bail, Result};
use sw_worker::ActivationOutcome;

use crate::context::Context;

/// Run the activate command.
pub async fn run(ctx: &Context) -> Result<()> {
    let worker = ctx.worker()?;
    ctx.output.header("Activate");

    let outcome = worker.activate().await;
    report(&outcome, ctx)
}

/// Print an activation outcome. A reset is reported as an error.
pub(crate) fn report(outcome: &ActivationOutcome, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(outcome);
    }

    match outcome {
        ActivationOutcome::Fresh { copied } => {
            ctx.output.success(&format!(
                "Content rebuilt from staged shell ({} entries)",
                copied.len()
            ));
        }
        ActivationOutcome::Upgraded {
            evicted,
            retained,
            copied,
        } => {
            ctx.output.success("Content reconciled with the previous build");
            ctx.output.kv("retained", &retained.len().to_string());
            ctx.output.kv("evicted", &evicted.len().to_string());
            ctx.output.kv("copied", &copied.len().to_string());
            if ctx.output.is_verbose() {
                for url in evicted {
                    ctx.output.list_item(&format!("evicted {}", url));
                }
            }
        }
        ActivationOutcome::Reset { reason } => {
            bail!("Activation failed and every cache region was reset: {}", reason);
        }
    }
    Ok(())
}
