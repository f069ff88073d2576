//! `nickwatch run` – preflight, optional scheduled wait, then claim until success.

use anyhow::{Context, Result};
use nickwatch_core::client::ApiClient;
use nickwatch_core::clock::SystemClock;
use nickwatch_core::config;
use nickwatch_core::control::CancelToken;
use nickwatch_core::monitor::{Monitor, MonitorSettings, RunOutcome};
use std::path::Path;

/// Runs the monitor on a blocking thread while this task listens for Ctrl-C.
/// Returns the process exit code.
pub async fn run_monitor(config_path: Option<&Path>) -> Result<i32> {
    let cfg = match config_path {
        Some(p) => config::load_from(p)?,
        None => config::load()?,
    }
    .context("no configuration found; run `nickwatch configure` first")?;
    tracing::debug!("loaded config: {:?}", cfg);

    let client = ApiClient::new(cfg.api_base(), &cfg.api_token, cfg.user_id)?;
    let settings = MonitorSettings::from(&cfg);

    let cancel = CancelToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping after the current request");
            signal_token.cancel();
        }
    });

    let outcome = tokio::task::spawn_blocking(move || {
        Monitor::new(client, SystemClock, cancel, settings).run()
    })
    .await
    .context("monitor thread panicked")?;

    Ok(exit_code(&outcome))
}

fn exit_code(outcome: &RunOutcome) -> i32 {
    if outcome.is_clean() {
        0
    } else {
        1
    }
}
