//! Source of "today" for date-partitioned storage.

use chrono::{Local, NaiveDate};

/// Supplies the calendar date used to partition uploads.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The server's local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
