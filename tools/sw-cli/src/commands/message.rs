//! Post a client message to the worker.

use anyhow::{Context as _, Result};

use super::MessageArgs;
use crate::context::Context;

/// Run the message command.
pub async fn run(args: MessageArgs, ctx: &Context) -> Result<()> {
    let worker = ctx.worker()?;

    let handled = worker
        .handle_message(&args.payload)
        .await
        .with_context(|| format!("Message '{}' failed", args.payload))?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "payload": args.payload,
            "handled": handled.map(|m| m.as_str()),
        }));
        return Ok(());
    }

    match handled {
        Some(message) => ctx.output.success(&format!("Handled '{}'", message)),
        None => ctx
            .output
            .warn(&format!("Ignored unrecognized message '{}'", args.payload)),
    }
    Ok(())
}
