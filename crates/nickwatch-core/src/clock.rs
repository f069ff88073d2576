//! Wall clock pinned to UTC+3.
//!
//! Start times in the config and the runtime comparisons in the schedule
//! waiter both go through [`monitor_offset`], so the host timezone never
//! matters. [`Clock`] is the seam tests use to run waits without sleeping.

use crate::control::{CancelToken, Cancelled};
use chrono::{DateTime, FixedOffset, Utc};
use std::time::Duration;

/// Offset of the platform's reference timezone (UTC+3) in seconds.
pub const MONITOR_UTC_OFFSET_SECS: i32 = 3 * 3600;

/// Longest uninterrupted sleep; cancellation is observed at this granularity.
pub const SLEEP_SLICE: Duration = Duration::from_millis(500);

pub fn monitor_offset() -> FixedOffset {
    FixedOffset::east_opt(MONITOR_UTC_OFFSET_SECS).expect("UTC+3 is a valid offset")
}

/// Time source and sleeper used by the monitor and the schedule waiter.
pub trait Clock {
    /// Current time in the monitor offset.
    fn now(&self) -> DateTime<FixedOffset>;
    /// Block the current thread for `d`.
    fn sleep(&self, d: Duration);
}

/// Real clock: system time and `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&monitor_offset())
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d)
    }
}

/// Sleep for `total`, in slices of at most [`SLEEP_SLICE`], stopping early
/// when `cancel` fires.
pub fn sleep_cancellable<C: Clock + ?Sized>(
    clock: &C,
    cancel: &CancelToken,
    total: Duration,
) -> Result<(), Cancelled> {
    let mut left = total;
    while !left.is_zero() {
        cancel.check()?;
        let step = left.min(SLEEP_SLICE);
        clock.sleep(step);
        left -= step;
    }
    cancel.check()
}


#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;

    #[test]
    fn system_clock_reports_utc_plus_three() {
        assert_eq!(SystemClock.now().offset().local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn sleep_is_sliced() {
        let clock = ManualClock::starting_now();
        sleep_cancellable(&clock, &CancelToken::new(), Duration::from_secs(5)).unwrap();
        assert_eq!(clock.total_slept(), Duration::from_secs(5));
        assert_eq!(clock.sleep_calls(), 10);
    }

    #[test]
    fn cancelled_sleep_returns_without_sleeping() {
        let clock = ManualClock::starting_now();
        let cancel = CancelToken::new();
        cancel.cancel();
        let res = sleep_cancellable(&clock, &cancel, Duration::from_secs(60));
        assert_eq!(res, Err(Cancelled));
        assert_eq!(clock.sleep_calls(), 0);
    }
}
