// SPDX-License-Identifier: MIT

//! Injectable clock, so the watchdog and timestamping logic can be tested
//! without sleeping.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Anything that can answer "what time is it" in UTC.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that returns a fixed (but adjustable) instant, for tests.
pub struct FakeClock {
    micros_since_epoch: AtomicI64,
}

impl FakeClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            micros_since_epoch: AtomicI64::new(
                now.timestamp_micros(),
            ),
        }
    }

    pub fn advance(&self, delta: chrono::Duration) {
        self.micros_since_epoch
            .fetch_add(delta.num_microseconds().unwrap_or(0), Ordering::SeqCst);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.micros_since_epoch
            .store(now.timestamp_micros(), Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.micros_since_epoch.load(Ordering::SeqCst))
            .unwrap_or_else(Utc::now)
    }
}
