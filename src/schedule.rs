use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{ContributionInterval, PeriodKey, PeriodWindow};
use crate::decimal::Money;
use crate::types::{Member, MemberId};

/// one period a member owes a contribution for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuePeriod {
    pub period_key: PeriodKey,
    pub interval: ContributionInterval,
    pub amount: Money,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
}

impl DuePeriod {
    fn new(period_key: PeriodKey, amount: Money) -> Self {
        let window = period_key.window();
        Self {
            period_key,
            interval: period_key.interval(),
            amount,
            window_start: window.start,
            window_end: window.end,
        }
    }

    pub fn window(&self) -> PeriodWindow {
        PeriodWindow {
            start: self.window_start,
            end: self.window_end,
        }
    }

    pub fn nominal_due_date(&self) -> NaiveDate {
        self.window_start
    }
}

/// dues schedule of one member up to an as-of date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueSchedule {
    pub member_id: MemberId,
    pub interval: Option<ContributionInterval>,
    pub as_of: NaiveDate,
    /// oldest first
    pub periods: Vec<DuePeriod>,
    pub total_due: Money,
}

impl DueSchedule {
    /// generate every due period from the first due period through the
    /// period containing `as_of`
    ///
    /// Members without billing terms get an empty schedule. Periods starting
    /// after the member's leave date are not due.
    pub fn generate(member: &Member, as_of: NaiveDate) -> Self {
        let interval = member.billing().map(|terms| terms.interval);
        let periods = match (member.billing(), first_due_period(member)) {
            (Some(terms), Some(first)) => {
                let current = PeriodKey::of(as_of, terms.interval);
                first
                    .iter_through(current)
                    .take_while(|key| match member.leave_date {
                        Some(leave_date) => key.window_start() <= leave_date,
                        None => true,
                    })
                    .map(|key| DuePeriod::new(key, terms.amount))
                    .collect()
            }
            _ => Vec::new(),
        };

        let total_due = periods.iter().map(|p| p.amount).sum();

        tracing::debug!(
            member_id = %member.id,
            as_of = %as_of,
            periods = periods.len(),
            "generated dues schedule"
        );

        Self {
            member_id: member.id,
            interval,
            as_of,
            periods,
            total_due,
        }
    }

    pub fn first_period(&self) -> Option<&DuePeriod> {
        self.periods.first()
    }

    /// last generated period, the one containing `as_of` unless the member left
    pub fn current_period(&self) -> Option<&DuePeriod> {
        self.periods.last()
    }

    pub fn get(&self, key: &PeriodKey) -> Option<&DuePeriod> {
        // periods are consecutive, so the offset from the first is the position
        let first = self.first_period()?;
        let offset = first.period_key.distance(key).ok()?;
        if offset < 0 {
            return None;
        }
        self.periods.get(offset as usize)
    }

    pub fn contains(&self, key: &PeriodKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// first period a member owes, none without billing terms
pub fn first_due_period(member: &Member) -> Option<PeriodKey> {
    let terms = member.billing()?;
    Some(PeriodKey::of(member.billing_anchor(), terms.interval))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn keys(schedule: &DueSchedule) -> Vec<String> {
        schedule.periods.iter().map(|p| p.period_key.to_string()).collect()
    }

    #[test]
    fn test_monthly_schedule_from_mid_month_join() {
        let member = Member::new("Ada", date(2024, 3, 15))
            .with_contribution(Money::from_decimal(dec!(10.00)), ContributionInterval::Monthly);

        let schedule = DueSchedule::generate(&member, date(2024, 6, 1));

        assert_eq!(keys(&schedule), vec!["2024-03", "2024-04", "2024-05", "2024-06"]);
        assert_eq!(schedule.total_due, Money::from_major(40));
        let first = schedule.first_period().unwrap();
        assert_eq!(first.window_start, date(2024, 3, 1));
        assert_eq!(first.window_end, date(2024, 3, 31));
        assert_eq!(first.amount, Money::from_major(10));
    }

    #[test]
    fn test_quarterly_and_yearly_schedules() {
        let quarterly = Member::new("Q", date(2023, 11, 2))
            .with_contribution(Money::from_major(30), ContributionInterval::Quarterly);
        let schedule = DueSchedule::generate(&quarterly, date(2024, 7, 1));
        assert_eq!(keys(&schedule), vec!["2023-Q4", "2024-Q1", "2024-Q2", "2024-Q3"]);

        let yearly = Member::new("Y", date(2021, 12, 31))
            .with_contribution(Money::from_major(120), ContributionInterval::Yearly);
        let schedule = DueSchedule::generate(&yearly, date(2024, 1, 1));
        assert_eq!(keys(&schedule), vec!["2021", "2022", "2023", "2024"]);
        assert_eq!(schedule.total_due, Money::from_major(480));
    }

    #[test]
    fn test_no_billing_yields_empty_schedule() {
        let member = Member::new("Free", date(2024, 1, 1));
        let schedule = DueSchedule::generate(&member, date(2024, 12, 31));
        assert!(schedule.is_empty());
        assert_eq!(schedule.interval, None);
        assert_eq!(schedule.total_due, Money::ZERO);
        assert!(first_due_period(&member).is_none());
    }

    #[test]
    fn test_next_due_override_takes_precedence_when_later() {
        let member = Member::new("Late start", date(2024, 1, 10))
            .with_contribution(Money::from_major(5), ContributionInterval::Monthly)
            .with_next_due_date(date(2024, 4, 1));
        let schedule = DueSchedule::generate(&member, date(2024, 5, 20));
        assert_eq!(keys(&schedule), vec!["2024-04", "2024-05"]);
    }

    #[test]
    fn test_leave_date_stops_accrual() {
        let member = Member::new("Leaver", date(2024, 1, 1))
            .with_contribution(Money::from_major(5), ContributionInterval::Monthly)
            .with_leave_date(date(2024, 3, 15));
        let schedule = DueSchedule::generate(&member, date(2024, 8, 1));
        assert_eq!(keys(&schedule), vec!["2024-01", "2024-02", "2024-03"]);

        // leaving on the first day of a period still owes that period
        let member = Member::new("Leaver", date(2024, 1, 1))
            .with_contribution(Money::from_major(5), ContributionInterval::Quarterly)
            .with_leave_date(date(2024, 4, 1));
        let schedule = DueSchedule::generate(&member, date(2024, 12, 1));
        assert_eq!(keys(&schedule), vec!["2024-Q1", "2024-Q2"]);
    }

    #[test]
    fn test_future_join_is_empty() {
        let member = Member::new("Future", date(2025, 2, 1))
            .with_contribution(Money::from_major(5), ContributionInterval::Monthly);
        assert!(DueSchedule::generate(&member, date(2025, 1, 31)).is_empty());
    }

    #[test]
    fn test_lookup_by_key() {
        let member = Member::new("Ada", date(2024, 11, 1))
            .with_contribution(Money::from_major(10), ContributionInterval::Monthly);
        let schedule = DueSchedule::generate(&member, date(2025, 2, 1));
        let jan = PeriodKey::parse("2025-01", ContributionInterval::Monthly).unwrap();
        assert_eq!(schedule.get(&jan).unwrap().period_key, jan);
        assert!(!schedule.contains(&PeriodKey::parse("2024-10", ContributionInterval::Monthly).unwrap()));
        assert!(!schedule.contains(&PeriodKey::parse("2025-03", ContributionInterval::Monthly).unwrap()));
        assert!(!schedule.contains(&PeriodKey::parse("2025-Q1", ContributionInterval::Quarterly).unwrap()));
        assert_eq!(schedule.current_period().unwrap().period_key.to_string(), "2025-02");
    }
}
