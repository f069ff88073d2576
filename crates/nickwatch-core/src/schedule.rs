//! Scheduled start: block until a UTC+3 timestamp, logging a coarse countdown.

use crate::clock::{sleep_cancellable, Clock};
use crate::control::{CancelToken, Cancelled};
use chrono::{DateTime, FixedOffset};
use std::time::Duration;

/// Longest single wait between countdown reports.
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(60);

/// Remaining time, at a granularity chosen by its magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    /// More than an hour left.
    HoursMinutes { hours: u64, minutes: u64 },
    /// More than a minute left.
    Minutes(u64),
    Seconds(u64),
}

impl Remaining {
    pub fn from_secs(secs: u64) -> Self {
        if secs > 3600 {
            Remaining::HoursMinutes {
                hours: secs / 3600,
                minutes: (secs % 3600) / 60,
            }
        } else if secs > 60 {
            Remaining::Minutes(secs / 60)
        } else {
            Remaining::Seconds(secs)
        }
    }
}

impl std::fmt::Display for Remaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Remaining::HoursMinutes { hours, minutes } => write!(f, "{hours}h {minutes}m"),
            Remaining::Minutes(m) => write!(f, "{m}m"),
            Remaining::Seconds(s) => write!(f, "{s}s"),
        }
    }
}

/// Blocks the calling thread until a target time.
pub struct ScheduleWaiter<'a, C: Clock> {
    clock: &'a C,
    cancel: &'a CancelToken,
}

impl<'a, C: Clock> ScheduleWaiter<'a, C> {
    pub fn new(clock: &'a C, cancel: &'a CancelToken) -> Self {
        Self { clock, cancel }
    }

    /// Wait until `target`, logging the countdown.
    pub fn wait_until(&self, target: DateTime<FixedOffset>) -> Result<(), Cancelled> {
        self.wait_until_with(target, |left| tracing::info!("time remaining: {}", left))
    }

    /// Wait until `target`, calling `on_report` with the remaining time once
    /// up front and again after every wake that still leaves time.
    pub fn wait_until_with<F>(
        &self,
        target: DateTime<FixedOffset>,
        mut on_report: F,
    ) -> Result<(), Cancelled>
    where
        F: FnMut(Remaining),
    {
        let Some(mut left) = self.remaining(target) else {
            tracing::info!("scheduled start time has already passed, starting now");
            return Ok(());
        };
        tracing::info!(
            "waiting until {} (UTC+3)",
            target
                .with_timezone(&crate::clock::monitor_offset())
                .format("%Y-%m-%d %H:%M:%S")
        );
        on_report(Remaining::from_secs(left.as_secs()));

        loop {
            sleep_cancellable(self.clock, self.cancel, left.min(COUNTDOWN_STEP))?;
            match self.remaining(target) {
                Some(d) => {
                    left = d;
                    if left.as_secs() > 0 {
                        on_report(Remaining::from_secs(left.as_secs()));
                    }
                }
                None => return Ok(()),
            }
        }
    }

    /// Time left until `target`, or `None` once it is reached.
    fn remaining(&self, target: DateTime<FixedOffset>) -> Option<Duration> {
        let diff = target.signed_duration_since(self.clock.now());
        diff.to_std().ok().filter(|d| !d.is_zero())
    }
}
