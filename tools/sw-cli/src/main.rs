//! swc - drive the asset caching worker from the command line.
//!
//! Commands:
//! - `swc install` - Stage the core shell into the temp region
//! - `swc activate` - Reconcile the content region with the current build
//! - `swc update` - Install then activate
//! - `swc fetch <path>` - Serve one request through the worker
//! - `swc offline` - Cache every manifest resource not yet cached
//! - `swc message <payload>` - Post a client message
//! - `swc status` - Show regions and the recorded-vs-current build diff
//! - `swc purge` - Delete all worker cache regions
//! - `swc config` - Manage configuration

mod commands;
mod config;
mod context;
mod net;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConfigArgs, FetchArgs, MessageArgs, PurgeArgs, UpdateArgs};

/// swc - Offline asset cache worker for single-page app bundles
#[derive(Parser)]
#[command(name = "swc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the core shell into the staging region
    Install,

    /// Promote the staged shell and evict stale entries
    Activate,

    /// Install and activate the current build
    Update(UpdateArgs),

    /// Serve a request through the worker
    Fetch(FetchArgs),

    /// Cache every manifest resource for offline use
    Offline,

    /// Post a message to the worker
    Message(MessageArgs),

    /// Show cache status
    Status,

    /// Delete all cache regions
    Purge(PurgeArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn,shellcache=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let result = match cli.command {
        Commands::Install => commands::install::run(&ctx).await,
        Commands::Activate => commands::activate::run(&ctx).await,
        Commands::Update(args) => commands::update::run(args, &ctx).await,
        Commands::Fetch(args) => commands::fetch::run(args, &ctx).await,
        Commands::Offline => commands::offline::run(&ctx).await,
        Commands::Message(args) => commands::message::run(args, &ctx).await,
        Commands::Status => commands::status::run(&ctx).await,
        Commands::Purge(args) => commands::purge::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
