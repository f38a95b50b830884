//! CLI command implementations.

pub mod activate;
pub mod config;
pub mod fetch;
pub mod install;
pub mod message;
pub mod offline;
pub mod purge;
pub mod status;
pub mod update;

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    /// Also fetch every resource missing from the cache.
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the fetch command.
#[derive(Args)]
pub struct FetchArgs {
    /// Path under the origin (e.g. `/`, `main.js?v=3`) or an absolute URL.
    pub path: String,

    /// HTTP method.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Write the response body to a file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the message command.
#[derive(Args)]
pub struct MessageArgs {
    /// Message payload (`skipWaiting` or `downloadOffline`).
    pub payload: String,
}

/// Arguments for the purge command.
#[derive(Args)]
pub struct PurgeArgs {
    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Origin the worker serves.
        #[arg(long, default_value = "http://localhost:8080")]
        origin: String,

        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
