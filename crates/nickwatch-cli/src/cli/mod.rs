//! CLI for the nickwatch username monitor.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_configure, run_monitor, run_show, ConfigureArgs};

/// Top-level CLI for nickwatch.
#[derive(Debug, Parser)]
#[command(name = "nickwatch")]
#[command(about = "nickwatch: keep trying to claim a username until it is yours", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Save the API token, account and target username.
    Configure(ConfigureArgs),

    /// Show the saved configuration (token hidden).
    Show,

    /// Check the API connection, then claim the username until it succeeds.
    Run {
        /// Read the configuration from this file instead of the XDG config dir.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

impl CliCommand {
    /// Dispatch the parsed command; returns the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Configure(args) => run_configure(&args)?,
            CliCommand::Show => run_show()?,
            CliCommand::Run { config } => return run_monitor(config.as_deref()).await,
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests;
