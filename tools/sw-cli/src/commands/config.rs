//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { origin, force } => init_config(&origin, force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    let worker = &ctx.config.worker;
    ctx.output.info("[worker]");
    ctx.output.kv("origin", &worker.origin);
    ctx.output.kv("regions.content", &worker.regions.content);
    ctx.output.kv("regions.temp", &worker.regions.temp);
    ctx.output.kv("regions.manifest", &worker.regions.manifest);

    ctx.output.info("[bundle]");
    ctx.output
        .kv("manifest", &ctx.config.bundle.manifest.display().to_string());

    ctx.output.info("[storage]");
    ctx.output.kv("dir", &ctx.storage_dir().display().to_string());

    if let Err(e) = ctx.worker_config() {
        ctx.output.warn(&format!("{:#}", e));
    }
    Ok(())
}

fn init_config(origin: &str, force: bool, ctx: &Context) -> Result<()> {
    let path = ctx.cwd.join("sw.toml");

    if path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    sw_core::WorkerConfig::new(origin)
        .validate()
        .context("Refusing to write an invalid origin")?;

    fs::write(&path, generate_default_config(origin))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    ctx.output.success(&format!("Created {}", path.display()));
    Ok(())
}
