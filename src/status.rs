use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::calendar::{ContributionInterval, PeriodKey};
use crate::config::MAX_TIMELINE_YEARS;
use crate::decimal::Money;
use crate::errors::Result;
use crate::ledger::{PaymentLedger, PaymentRecord};
use crate::schedule::{first_due_period, DueSchedule};
use crate::types::Member;

/// overall dues standing of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuesState {
    /// every due period up to the current one is paid
    Ok,
    Overdue,
    /// no recurring billing configured; neither ok nor overdue
    NotBilled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub state: DuesState,
    pub overdue_count: usize,
    /// unpaid due periods, oldest first
    pub overdue_periods: Vec<PeriodKey>,
    pub overdue_amount: Money,
    pub join_date: NaiveDate,
    pub last_paid_period: Option<PeriodKey>,
    pub last_paid_date: Option<DateTime<Utc>>,
    pub initial_due_date: Option<NaiveDate>,
    pub interval: Option<ContributionInterval>,
    /// oldest period still owed, or the next unpaid one after the current period
    pub next_due_period: Option<PeriodKey>,
}

impl StatusSummary {
    pub fn is_overdue(&self) -> bool {
        self.state == DuesState::Overdue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineLabel {
    Paid,
    Overdue,
    Current,
    Upcoming,
    /// after the member's leave date
    NotDue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub period_key: PeriodKey,
    pub label: TimelineLabel,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub paid_amount: Option<Money>,
}

/// combines the due schedule with ledger state
pub struct StatusAggregator<'a> {
    ledger: &'a PaymentLedger,
}

impl<'a> StatusAggregator<'a> {
    pub fn new(ledger: &'a PaymentLedger) -> Self {
        Self { ledger }
    }

    /// dues standing of `member` as of a date
    ///
    /// The last paid period is chosen by period order, so a late back-payment
    /// for an old period never looks more recent than a newer period.
    pub fn status(&self, member: &Member, as_of: NaiveDate) -> Result<StatusSummary> {
        let schedule = DueSchedule::generate(member, as_of);
        let paid = self.paid_by_period(member)?;
        let latest = self.ledger.latest_by_period(&member.id)?;

        let overdue: Vec<_> = schedule
            .periods
            .iter()
            .filter(|due| !paid.contains_key(&due.period_key))
            .collect();
        let overdue_periods: Vec<PeriodKey> = overdue.iter().map(|due| due.period_key).collect();
        let overdue_amount: Money = overdue.iter().map(|due| due.amount).sum();

        let state = match member.billing() {
            None => DuesState::NotBilled,
            Some(_) if overdue_periods.is_empty() => DuesState::Ok,
            Some(_) => DuesState::Overdue,
        };

        let next_due_period = match overdue_periods.first() {
            Some(oldest) => Some(*oldest),
            None => self.next_unpaid_after(member, as_of, &paid),
        };

        if state == DuesState::Overdue {
            tracing::debug!(
                member_id = %member.id,
                as_of = %as_of,
                overdue = overdue_periods.len(),
                "member has overdue dues"
            );
        }

        Ok(StatusSummary {
            state,
            overdue_count: overdue_periods.len(),
            overdue_periods,
            overdue_amount,
            join_date: member.join_date,
            last_paid_period: latest.as_ref().map(|record| record.period_key),
            last_paid_date: latest.as_ref().map(|record| record.date_paid),
            initial_due_date: schedule.first_period().map(|due| due.window_start),
            interval: schedule.interval,
            next_due_period,
        })
    }

    /// bounded display window around the current period
    ///
    /// Starts `past` periods before the current one but never before the first
    /// due period, and ends `future` periods after it. Each side is capped at
    /// [`MAX_TIMELINE_YEARS`] worth of periods.
    pub fn timeline(
        &self,
        member: &Member,
        as_of: NaiveDate,
        past: u32,
        future: u32,
    ) -> Result<Vec<TimelineEntry>> {
        let (terms, first_due) = match (member.billing(), first_due_period(member)) {
            (Some(terms), Some(first_due)) => (terms, first_due),
            _ => return Ok(Vec::new()),
        };

        let cap = terms.interval.periods_per_year() * MAX_TIMELINE_YEARS;
        let current = PeriodKey::of(as_of, terms.interval);
        let start = current.offset(-i64::from(past.min(cap))).max(first_due);
        let end = current.offset(i64::from(future.min(cap)));
        let paid = self.paid_by_period(member)?;

        let entries = start
            .iter_through(end)
            .map(|key| {
                let record = paid.get(&key);
                let label = if record.is_some() {
                    TimelineLabel::Paid
                } else if member.leave_date.map_or(false, |left| key.window_start() > left) {
                    TimelineLabel::NotDue
                } else if key == current {
                    TimelineLabel::Current
                } else if key < current {
                    TimelineLabel::Overdue
                } else {
                    TimelineLabel::Upcoming
                };
                let window = key.window();
                TimelineEntry {
                    period_key: key,
                    label,
                    window_start: window.start,
                    window_end: window.end,
                    paid_amount: record.map(|r| r.amount),
                }
            })
            .collect();

        Ok(entries)
    }

    fn paid_by_period(&self, member: &Member) -> Result<HashMap<PeriodKey, PaymentRecord>> {
        Ok(self
            .ledger
            .records_for(&member.id)?
            .into_iter()
            .map(|record| (record.period_key, record))
            .collect())
    }

    fn next_unpaid_after(
        &self,
        member: &Member,
        as_of: NaiveDate,
        paid: &HashMap<PeriodKey, PaymentRecord>,
    ) -> Option<PeriodKey> {
        let terms = member.billing()?;
        let first_due = first_due_period(member)?;
        let current = PeriodKey::of(as_of, terms.interval);
        let mut candidate = if first_due > current {
            first_due
        } else {
            current.next()
        };
        // prepaid periods are skipped, at most one step per record
        for _ in 0..=paid.len() {
            if member
                .leave_date
                .map_or(false, |left| candidate.window_start() > left)
            {
                return None;
            }
            if !paid.contains_key(&candidate) {
                return Some(candidate);
            }
            candidate = candidate.next();
        }
        None
    }
}
