//! Command-line interface definitions.
//!
//! Defines the CLI structure for liqwatch using `clap`: running the watcher,
//! inspecting the persisted statistics, and validating configuration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::paths;

/// Exchange liquidation feed watcher
#[derive(Parser, Debug)]
#[command(name = "liqwatch")]
#[command(version, about)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity (-v debug logs, -vv trace logs)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the liquidation feed and send notifications (foreground)
    Run(ConfigPathArg),

    /// Show the persisted per-symbol statistics
    Stats(StatsArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `liqwatch check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file and environment.
    Config(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for the `stats` subcommand.
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Path to the configuration file (locates the statistics file).
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Read this statistics file instead of the configured one.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Only show this symbol.
    #[arg(long)]
    pub symbol: Option<String>,
}
