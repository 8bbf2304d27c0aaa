use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::calendar::ContributionInterval;
use crate::errors::{DuesError, Result};

/// year digits accepted from operator input
const STRICT_YEAR_DIGITS: RangeInclusive<usize> = 4..=4;
/// year digits `Display` can produce for any chrono date
const CANONICAL_YEAR_DIGITS: RangeInclusive<usize> = 4..=6;

/// canonical identifier of one billing period
///
/// Only constructed through [`PeriodKey::of`], [`PeriodKey::parse`] or stepping
/// an existing key, so every value is well formed. Ordering within one
/// interval follows the period index (`year * 12 + month`, `year * 4 + quarter`
/// or the year), never the text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey {
    interval: ContributionInterval,
    year: i32,
    /// 1-based month, quarter, or 1 for yearly keys
    ordinal: u32,
}

impl PeriodKey {
    /// period containing `date` under `interval`
    pub fn of(date: NaiveDate, interval: ContributionInterval) -> Self {
        let ordinal = match interval {
            ContributionInterval::Monthly => date.month(),
            ContributionInterval::Quarterly => (date.month() + 2) / 3,
            ContributionInterval::Yearly => 1,
        };
        Self {
            interval,
            year: date.year(),
            ordinal,
        }
    }

    /// strict parse of user-supplied text for a known interval
    ///
    /// Accepts `YYYY-MM` (01-12), `YYYY-Qn` (1-4) or `YYYY`; surrounding
    /// whitespace is ignored, anything else is rejected.
    pub fn parse(input: &str, interval: ContributionInterval) -> Result<Self> {
        Self::parse_key(input.trim(), interval, STRICT_YEAR_DIGITS)
            .ok_or_else(|| DuesError::invalid_format(input, interval))
    }

    fn parse_key(
        s: &str,
        interval: ContributionInterval,
        year_digits: RangeInclusive<usize>,
    ) -> Option<Self> {
        if !s.is_ascii() {
            return None;
        }
        let digits = s.bytes().take_while(u8::is_ascii_digit).count();
        if !year_digits.contains(&digits) {
            return None;
        }
        let (year_text, rest) = s.split_at(digits);
        let year = i32::try_from(parse_digits(year_text)?).ok()?;

        let ordinal = match interval {
            ContributionInterval::Monthly => {
                let month = rest.strip_prefix('-').filter(|m| m.len() == 2)?;
                parse_digits(month).filter(|m| (1..=12).contains(m))?
            }
            ContributionInterval::Quarterly => {
                let quarter = rest.strip_prefix("-Q").filter(|q| q.len() == 1)?;
                parse_digits(quarter).filter(|q| (1..=4).contains(q))?
            }
            ContributionInterval::Yearly if rest.is_empty() => 1,
            ContributionInterval::Yearly => return None,
        };

        Some(Self {
            interval,
            year,
            ordinal,
        })
    }

    /// rebuild a key from its integer projection
    pub fn from_index(interval: ContributionInterval, index: i64) -> Self {
        let (year, ordinal) = match interval {
            ContributionInterval::Monthly => (index.div_euclid(12), index.rem_euclid(12) + 1),
            ContributionInterval::Quarterly => (index.div_euclid(4), index.rem_euclid(4) + 1),
            ContributionInterval::Yearly => (index, 1),
        };
        Self {
            interval,
            year: year as i32,
            ordinal: ordinal as u32,
        }
    }

    pub fn interval(&self) -> ContributionInterval {
        self.interval
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month (monthly), quarter (quarterly) or 1 (yearly)
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// integer projection used for ordering and stepping
    pub fn index(&self) -> i64 {
        let year = self.year as i64;
        let ordinal = self.ordinal as i64;
        match self.interval {
            ContributionInterval::Monthly => year * 12 + ordinal - 1,
            ContributionInterval::Quarterly => year * 4 + ordinal - 1,
            ContributionInterval::Yearly => year,
        }
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    pub fn prev(&self) -> Self {
        self.offset(-1)
    }

    /// step by `periods` units of this key's interval (negative steps back)
    pub fn offset(&self, periods: i64) -> Self {
        Self::from_index(self.interval, self.index() + periods)
    }

    /// number of periods from `self` to `other` (positive when `other` is later)
    pub fn distance(&self, other: &PeriodKey) -> Result<i64> {
        self.ensure_same_interval(other)?;
        Ok(other.index() - self.index())
    }

    /// total order within one interval
    pub fn compare(&self, other: &PeriodKey) -> Result<Ordering> {
        self.ensure_same_interval(other)?;
        Ok(self.index().cmp(&other.index()))
    }

    /// first and last calendar day covered by the period
    pub fn window(&self) -> PeriodWindow {
        PeriodWindow {
            start: self.window_start(),
            end: self.window_end(),
        }
    }

    pub fn window_start(&self) -> NaiveDate {
        ymd(self.year, self.first_month(), 1)
    }

    pub fn window_end(&self) -> NaiveDate {
        let last_month = self.first_month() + self.interval.months_per_period() - 1;
        ymd(self.year, last_month, days_in_month(self.year, last_month))
    }

    /// date the contribution is nominally due, the first day of the period
    pub fn nominal_due_date(&self) -> NaiveDate {
        self.window_start()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        PeriodKey::of(date, self.interval) == *self
    }

    /// iterate from `self` through `end` inclusive, empty when `end` is earlier
    ///
    /// An `end` under a different interval is projected onto this key's
    /// calendar by its window start.
    pub fn iter_through(&self, end: PeriodKey) -> PeriodIter {
        let end = if end.interval == self.interval {
            end
        } else {
            PeriodKey::of(end.window_start(), self.interval)
        };
        PeriodIter {
            next: if *self <= end { Some(*self) } else { None },
            end,
        }
    }

    fn first_month(&self) -> u32 {
        match self.interval {
            ContributionInterval::Monthly => self.ordinal,
            ContributionInterval::Quarterly => (self.ordinal - 1) * 3 + 1,
            ContributionInterval::Yearly => 1,
        }
    }

    /// months since year zero of the period's first month
    fn start_month_index(&self) -> i64 {
        self.year as i64 * 12 + self.first_month() as i64 - 1
    }

    fn ensure_same_interval(&self, other: &PeriodKey) -> Result<()> {
        if self.interval != other.interval {
            return Err(DuesError::IntervalMismatch {
                left: self.to_string(),
                right: other.to_string(),
            });
        }
        Ok(())
    }
}

// within one interval this is the index order; across intervals keys are
// ordered by the month they start in, monthly before quarterly before yearly
impl Ord for PeriodKey {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.interval == other.interval {
            return self.index().cmp(&other.index());
        }
        self.start_month_index()
            .cmp(&other.start_month_index())
            .then(self.interval.cmp(&other.interval))
    }
}

impl PartialOrd for PeriodKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.interval {
            ContributionInterval::Monthly => write!(f, "{:04}-{:02}", self.year, self.ordinal),
            ContributionInterval::Quarterly => write!(f, "{:04}-Q{}", self.year, self.ordinal),
            ContributionInterval::Yearly => write!(f, "{:04}", self.year),
        }
    }
}

/// parse with the interval inferred from the key shape
///
/// Accepts every key `Display` produces, including years past 9999.
impl FromStr for PeriodKey {
    type Err = DuesError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let suffix = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
        let interval = if suffix.is_empty() {
            ContributionInterval::Yearly
        } else if suffix.starts_with("-Q") {
            ContributionInterval::Quarterly
        } else {
            ContributionInterval::Monthly
        };
        PeriodKey::parse_key(trimmed, interval, CANONICAL_YEAR_DIGITS).ok_or_else(|| {
            DuesError::InvalidPeriodFormat {
                input: s.to_string(),
                interval: format!("inferred {}", interval),
            }
        })
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = DuesError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

/// inclusive calendar window of a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// widen the window by whole days on each side
    pub fn widen(&self, before_days: i64, after_days: i64) -> PeriodWindow {
        PeriodWindow {
            start: self
                .start
                .checked_sub_signed(Duration::days(before_days))
                .unwrap_or(NaiveDate::MIN),
            end: self
                .end
                .checked_add_signed(Duration::days(after_days))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// days from the window to `date`, zero when inside
    pub fn days_outside(&self, date: NaiveDate) -> i64 {
        if date < self.start {
            (self.start - date).num_days()
        } else if date > self.end {
            (date - self.end).num_days()
        } else {
            0
        }
    }
}

/// ascending iterator over consecutive period keys
#[derive(Debug, Clone)]
pub struct PeriodIter {
    next: Option<PeriodKey>,
    end: PeriodKey,
}

impl Iterator for PeriodIter {
    type Item = PeriodKey;

    fn next(&mut self) -> Option<PeriodKey> {
        let current = self.next?;
        self.next = if current < self.end {
            Some(current.next())
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(current) => {
                let remaining = (self.end.index() - current.index() + 1).max(0) as usize;
                (remaining, Some(remaining))
            }
            None => (0, Some(0)),
        }
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
