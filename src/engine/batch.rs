use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{ContributionInterval, PeriodKey};
use crate::decimal::Money;
use crate::errors::{DuesError, Result};
use crate::ledger::PaymentRecord;
use crate::schedule::first_due_period;
use crate::types::{Member, MemberId};

/// periods a billing run covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodSelector {
    /// one period key as typed by the operator
    Period(String),
    /// every period overlapping the inclusive date range
    DateRange { from: NaiveDate, to: NaiveDate },
}

impl PeriodSelector {
    pub fn period(key: impl Into<String>) -> Self {
        PeriodSelector::Period(key.into())
    }

    pub fn date_range(from: NaiveDate, to: NaiveDate) -> Self {
        PeriodSelector::DateRange { from, to }
    }

    /// resolve into ascending period keys of `interval`
    pub fn resolve(&self, interval: ContributionInterval) -> Result<Vec<PeriodKey>> {
        match self {
            PeriodSelector::Period(text) => Ok(vec![PeriodKey::parse(text, interval)?]),
            PeriodSelector::DateRange { from, to } => {
                if from > to {
                    return Err(DuesError::InvalidDateRange {
                        from: *from,
                        to: *to,
                    });
                }
                let first = PeriodKey::of(*from, interval);
                Ok(first.iter_through(PeriodKey::of(*to, interval)).collect())
            }
        }
    }
}

/// one member's standing for one period of a billing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueRow {
    pub member_id: MemberId,
    pub member_name: String,
    pub period_key: PeriodKey,
    /// nominal amount from the member's billing terms
    pub amount: Money,
    pub paid: bool,
    pub record: Option<PaymentRecord>,
}

/// true when `member` owes a contribution for `period_key`
///
/// Billing runs may look ahead, so the as-of date does not bound this.
pub(crate) fn is_due_for(member: &Member, period_key: &PeriodKey) -> bool {
    let first_due = match first_due_period(member) {
        Some(first_due) if first_due.interval() == period_key.interval() => first_due,
        _ => return false,
    };
    *period_key >= first_due
        && member
            .leave_date
            .map_or(true, |left| period_key.window_start() <= left)
}
