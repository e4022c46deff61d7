//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `gridwatch`.
#[derive(Debug, Parser)]
#[command(name = "gridwatch", version, about = "Watch a power signal and notify chat subscribers")]
pub struct Cli {
    /// Where settings come from.
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Log filter directive, e.g. `info` or `gridwatch=debug`.
    #[arg(long, env = "GRIDWATCH_LOG", default_value = "info", global = true)]
    pub log_level: String,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Settings that override the JSON config file.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// JSON config file with `BOT_TOKEN`, `PROBE_URL` and `SUBSCRIBERS_FILE`.
    #[arg(long = "config", env = "GRIDWATCH_CONFIG", default_value = "config.json", global = true)]
    pub config_file: PathBuf,
    /// Bot access token.
    #[arg(long, env = "GRIDWATCH_BOT_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,
    /// Base address of the power endpoint.
    #[arg(long, env = "GRIDWATCH_PROBE_URL", global = true)]
    pub probe_url: Option<String>,
    /// Subscriber file.
    #[arg(long, env = "GRIDWATCH_SUBSCRIBERS", global = true)]
    pub subscribers: Option<PathBuf>,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bot until interrupted.
    Run,
    /// Probe the power endpoint once and print the reading.
    Probe,
    /// List stored subscribers.
    Subscribers,
}
