//! `nickwatch show` – print the saved config.

use anyhow::Result;
use nickwatch_core::config::{self, MonitorConfig};

pub fn run_show() -> Result<()> {
    match config::load()? {
        Some(cfg) => print_summary(&cfg),
        None => println!("No configuration found. Run `nickwatch configure` first."),
    }
    Ok(())
}

pub(super) fn print_summary(cfg: &MonitorConfig) {
    println!("Target:   {}", cfg.target_username);
    println!("User ID:  {}", cfg.user_id);
    println!("Interval: {}s", cfg.check_interval_secs);
    match cfg.start_time {
        Some(start) => println!("Start:    {} (scheduled)", start.format("%Y-%m-%d %H:%M %:z")),
        None => println!("Mode:     continuous"),
    }
    println!("API:      {}", cfg.api_base());
}
