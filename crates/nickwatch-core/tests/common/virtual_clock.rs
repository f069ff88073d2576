//! Clock whose `sleep` only advances virtual time, so retry waits cost nothing.

use chrono::{DateTime, FixedOffset};
use nickwatch_core::clock::{Clock, SystemClock};
use std::cell::{Cell, RefCell};
use std::time::Duration;

pub struct VirtualClock {
    now: Cell<DateTime<FixedOffset>>,
    slept: RefCell<Vec<Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(SystemClock.now()),
            slept: RefCell::new(Vec::new()),
        }
    }

    pub fn total_slept(&self) -> Duration {
        self.slept.borrow().iter().sum()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now.get()
    }

    fn sleep(&self, d: Duration) {
        self.now
            .set(self.now.get() + chrono::Duration::from_std(d).unwrap());
        self.slept.borrow_mut().push(d);
    }
}
