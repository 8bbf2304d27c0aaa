/// serializable views for callers that render dues state
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::ContributionInterval;
use crate::decimal::Money;
use crate::engine::{DueRow, PeriodSelector};
use crate::ledger::PaymentRecord;
use crate::status::{StatusSummary, TimelineEntry};
use crate::types::MemberId;

/// one member's dues page: status, timeline and recent payments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDuesView {
    pub member_id: MemberId,
    pub name: String,
    pub as_of: NaiveDate,
    pub status: StatusSummary,
    pub timeline: Vec<TimelineEntry>,
    /// newest first
    pub recent_payments: Vec<PaymentRecord>,
}

impl MemberDuesView {
    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// rows of one billing run with totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingRunView {
    pub interval: ContributionInterval,
    pub selector: PeriodSelector,
    pub rows: Vec<DueRow>,
    pub totals: BillingRunTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillingRunTotals {
    pub paid_count: usize,
    pub unpaid_count: usize,
    /// sum of recorded payment amounts
    pub collected: Money,
    /// sum of nominal amounts of unpaid rows
    pub outstanding: Money,
}

impl BillingRunView {
    pub fn from_rows(interval: ContributionInterval, selector: PeriodSelector, rows: Vec<DueRow>) -> Self {
        let mut totals = BillingRunTotals {
            paid_count: 0,
            unpaid_count: 0,
            collected: Money::ZERO,
            outstanding: Money::ZERO,
        };
        for row in &rows {
            match &row.record {
                Some(record) => {
                    totals.paid_count += 1;
                    totals.collected += record.amount;
                }
                None => {
                    totals.unpaid_count += 1;
                    totals.outstanding += row.amount;
                }
            }
        }
        Self {
            interval,
            selector,
            rows,
            totals,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
