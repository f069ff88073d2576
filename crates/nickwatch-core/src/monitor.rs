//! Monitor loop: preflight → optional scheduled wait → claim until success.
//!
//! The loop is the only stateful piece. It owns the API client and the
//! clock, numbers attempts strictly in order, and never has more than one
//! request in flight. It never returns an `Err`: every way the run can end
//! is a [`RunOutcome`] variant, and each is logged before returning.

use crate::client::{AccountApi, ClientError};
use crate::clock::{sleep_cancellable, Clock};
use crate::config::{Mode, MonitorConfig};
use crate::control::{CancelToken, Cancelled};
use crate::retry::{AttemptResult, RetryDecision, RetryPolicy};
use crate::schedule::ScheduleWaiter;
use chrono::{DateTime, FixedOffset};
use std::time::Duration;
use thiserror::Error;

/// Why the preflight probe refused to start the loop.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("invalid API token (401)")]
    InvalidToken,
    #[error("user not found (404)")]
    UserNotFound,
    #[error("unexpected API status {0}")]
    UnexpectedStatus(u32),
    #[error("connection failed: {0}")]
    Transport(#[from] ClientError),
}

/// How a monitor run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The name was claimed on attempt `attempts`.
    Claimed { attempts: u64 },
    /// The operator stopped the run.
    Cancelled { attempts: u64 },
    /// Preflight failed; no claim was attempted.
    PreflightFailed(ConnectivityError),
    /// The loop hit a failure it cannot classify and gave up.
    Aborted { attempts: u64, reason: String },
}

impl RunOutcome {
    /// Claimed and cancelled runs are clean exits.
    pub fn is_clean(&self) -> bool {
        matches!(self, RunOutcome::Claimed { .. } | RunOutcome::Cancelled { .. })
    }
}

/// What the monitor needs from the config.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub target_username: String,
    pub check_interval: Duration,
    /// `Some` in scheduled mode.
    pub start_time: Option<DateTime<FixedOffset>>,
    pub policy: RetryPolicy,
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(cfg: &MonitorConfig) -> Self {
        Self {
            target_username: cfg.target_username.clone(),
            check_interval: Duration::from_secs(cfg.check_interval_secs),
            start_time: match cfg.mode {
                Mode::Scheduled => cfg.start_time,
                Mode::Continuous => None,
            },
            policy: cfg.retry_policy(),
        }
    }
}

#[derive(Debug, Default)]
struct LoopState {
    attempt_count: u64,
    terminated: bool,
}

/// Ways the polling phase stops early.
enum Interrupt {
    Cancelled,
    Fatal(ClientError),
}

impl From<Cancelled> for Interrupt {
    fn from(_: Cancelled) -> Self {
        Interrupt::Cancelled
    }
}

pub struct Monitor<A, C> {
    api: A,
    clock: C,
    cancel: CancelToken,
    settings: MonitorSettings,
}

impl<A: AccountApi, C: Clock> Monitor<A, C> {
    pub fn new(api: A, clock: C, cancel: CancelToken, settings: MonitorSettings) -> Self {
        Self {
            api,
            clock,
            cancel,
            settings,
        }
    }

    /// Run to completion. Blocks the calling thread.
    pub fn run(&mut self) -> RunOutcome {
        tracing::info!("starting username monitor");
        tracing::info!("target: {}", self.settings.target_username);
        tracing::info!("interval: {}s", self.settings.check_interval.as_secs());

        if let Err(e) = self.preflight() {
            tracing::error!("could not connect to the API: {}", e);
            return RunOutcome::PreflightFailed(e);
        }

        if let Some(start) = self.settings.start_time {
            if ScheduleWaiter::new(&self.clock, &self.cancel)
                .wait_until(start)
                .is_err()
            {
                tracing::info!("monitor stopped by operator before the scheduled start");
                return RunOutcome::Cancelled { attempts: 0 };
            }
        }

        tracing::info!("monitoring started");
        let mut state = LoopState::default();
        let result = self.poll(&mut state);
        let attempts = state.attempt_count;
        match result {
            Ok(()) => {
                debug_assert!(state.terminated);
                tracing::info!(attempts, "monitoring finished after {} attempt(s)", attempts);
                RunOutcome::Claimed { attempts }
            }
            Err(Interrupt::Cancelled) => {
                tracing::info!(attempts, "monitor stopped by operator");
                RunOutcome::Cancelled { attempts }
            }
            Err(Interrupt::Fatal(e)) => {
                tracing::error!(attempts, "critical error, monitor stopped: {}", e);
                RunOutcome::Aborted {
                    attempts,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn preflight(&mut self) -> Result<(), ConnectivityError> {
        let resp = self.api.probe()?;
        match resp.status {
            200 => {
                tracing::info!("API connection established");
                Ok(())
            }
            401 => Err(ConnectivityError::InvalidToken),
            404 => Err(ConnectivityError::UserNotFound),
            code => Err(ConnectivityError::UnexpectedStatus(code)),
        }
    }

    fn poll(&mut self, state: &mut LoopState) -> Result<(), Interrupt> {
        while !state.terminated {
            self.cancel.check()?;
            state.attempt_count += 1;
            tracing::info!(
                attempt = state.attempt_count,
                "attempt #{}: claiming '{}'",
                state.attempt_count,
                self.settings.target_username
            );

            let result = self.attempt()?;
            match self
                .settings
                .policy
                .decide(result.outcome, self.settings.check_interval)
            {
                RetryDecision::Stop => {
                    tracing::info!(
                        status = result.status_code,
                        outcome = %result.outcome,
                        "SUCCESS: {} ('{}')",
                        result.message,
                        self.settings.target_username
                    );
                    state.terminated = true;
                }
                RetryDecision::RetryAfter(delay) => {
                    log_retry(&result, delay);
                    sleep_cancellable(&self.clock, &self.cancel, delay)?;
                }
            }
        }
        Ok(())
    }

    fn attempt(&mut self) -> Result<AttemptResult, Interrupt> {
        match self.api.claim(&self.settings.target_username) {
            Ok(resp) => Ok(AttemptResult::from_response(resp.status, &resp.body)),
            Err(e) if e.is_network() => Ok(AttemptResult::network_error(&e)),
            Err(e) => Err(Interrupt::Fatal(e)),
        }
    }
}

fn log_retry(result: &AttemptResult, delay: Duration) {
    if result.outcome.is_transient() {
        tracing::warn!(
            status = result.status_code,
            outcome = %result.outcome,
            "{}; cooling down {}s",
            result.message,
            delay.as_secs()
        );
    } else {
        tracing::info!(
            status = result.status_code,
            outcome = %result.outcome,
            "{}; retrying in {}s",
            result.message,
            delay.as_secs()
        );
    }
}
