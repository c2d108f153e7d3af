//! Test clock — deterministic `Clock` implementation for tests.

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use pitchside_core::clock::Clock;

/// A clock that always returns a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// A clock fixed at 09:00 UTC on the given date.
    ///
    /// # Panics
    ///
    /// Panics if the date is invalid.
    #[must_use]
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, 9, 0, 0)
                .single()
                .expect("valid calendar date"),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// A clock starting at 09:00 UTC on the given date.
    ///
    /// # Panics
    ///
    /// Panics if the date is invalid.
    #[must_use]
    pub fn starting_on(year: i32, month: u32, day: u32) -> Self {
        Self {
            now: Mutex::new(FixedClock::on(year, month, day).0),
        }
    }

    /// Moves the clock forward by `delta`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn advance(&self, delta: TimeDelta) {
        *self.now.lock().unwrap() += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
