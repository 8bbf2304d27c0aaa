//! Period arithmetic for billing intervals.
//!
//! Every comparison, step and window computation on billing periods goes
//! through this module.

pub mod interval;
pub mod period;

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::errors::Result;

pub use interval::ContributionInterval;
pub use period::{PeriodIter, PeriodKey, PeriodWindow};

/// canonical key of the period containing `date`
pub fn period_key_of(date: NaiveDate, interval: ContributionInterval) -> PeriodKey {
    PeriodKey::of(date, interval)
}

pub fn next(key: &PeriodKey) -> PeriodKey {
    key.next()
}

pub fn prev(key: &PeriodKey) -> PeriodKey {
    key.prev()
}

/// order two keys of the same interval
pub fn compare(a: &PeriodKey, b: &PeriodKey) -> Result<Ordering> {
    a.compare(b)
}

/// first and last day of the period
pub fn range_of(key: &PeriodKey) -> PeriodWindow {
    key.window()
}

/// validate user-typed period text under `interval`
pub fn parse(input: &str, interval: ContributionInterval) -> Result<PeriodKey> {
    PeriodKey::parse(input, interval)
}
