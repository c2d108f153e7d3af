//! Clock abstraction for determinism.

use chrono::{DateTime, NaiveDate, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current calendar date (UTC).
    ///
    /// Encounter dates, the "immediate" date mode and the scheduled-date
    /// lower bound are all derived from this value.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
