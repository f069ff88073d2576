//! `nickwatch configure` – validate and save the monitor config.

use anyhow::Result;
use clap::Args;
use nickwatch_core::config::{self, parse_start_time, MonitorConfig};

#[derive(Debug, Args)]
pub struct ConfigureArgs {
    /// API bearer token.
    #[arg(long)]
    pub token: String,

    /// Numeric ID of the account to rename.
    #[arg(long)]
    pub user_id: u64,

    /// Username to claim.
    #[arg(long)]
    pub username: String,

    /// Seconds between attempts after a rejection (minimum 1).
    #[arg(long, default_value = "5", value_name = "SECS")]
    pub interval: u64,

    /// Start at this time (UTC+3, "YYYY-MM-DD HH:MM") instead of right away.
    #[arg(long, value_name = "WHEN")]
    pub start: Option<String>,

    /// Override the API base URL.
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,
}

impl ConfigureArgs {
    pub fn to_config(&self) -> Result<MonitorConfig> {
        let mut cfg =
            MonitorConfig::continuous(&self.token, self.user_id, &self.username, self.interval);
        if let Some(start) = &self.start {
            cfg = cfg.scheduled_at(parse_start_time(start)?);
        }
        cfg.api_base = self.api_base.clone();
        cfg.validate()?;
        Ok(cfg)
    }
}

pub fn run_configure(args: &ConfigureArgs) -> Result<()> {
    let cfg = args.to_config()?;
    let path = config::save(&cfg)?;
    println!("Configuration saved to {}", path.display());
    super::show::print_summary(&cfg);
    Ok(())
}
