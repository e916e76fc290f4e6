//! Injectable time source.
//!
//! The engine stamps reservations, loans, and returns with "now". Production
//! code uses [`SystemClock`]; tests drive a [`ManualClock`] so queue order and
//! due dates are deterministic.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to, with one-second resolution.
#[derive(Debug)]
pub struct ManualClock {
    epoch_secs: AtomicI64,
}

impl ManualClock {
    #[must_use]
    pub const fn at(epoch_secs: i64) -> Self {
        Self {
            epoch_secs: AtomicI64::new(epoch_secs),
        }
    }

    pub fn set(&self, epoch_secs: i64) {
        self.epoch_secs.store(epoch_secs, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.epoch_secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.epoch_secs.load(Ordering::SeqCst), 0)
            .unwrap_or(DateTime::UNIX_EPOCH)
    }
}
