use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::ContributionInterval;
use crate::decimal::Money;

/// unique identifier for a member
pub type MemberId = Uuid;

/// identifier of a transaction (voucher) in the external accounting store
pub type VoucherId = String;

/// membership status as maintained by the membership module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Active,
    /// membership on hold, dues keep accruing
    Passive,
    /// membership ended, see `leave_date`
    Left,
}

/// member record, read-only for the dues engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub join_date: NaiveDate,
    pub leave_date: Option<NaiveDate>,
    pub contribution_amount: Option<Money>,
    pub contribution_interval: Option<ContributionInterval>,
    /// operator override for the first due date
    pub next_due_date: Option<NaiveDate>,
    pub status: MemberStatus,
}

/// amount and interval of a member's recurring contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingTerms {
    pub amount: Money,
    pub interval: ContributionInterval,
}

impl Member {
    /// create active member without billing
    pub fn new(name: impl Into<String>, join_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            join_date,
            leave_date: None,
            contribution_amount: None,
            contribution_interval: None,
            next_due_date: None,
            status: MemberStatus::Active,
        }
    }

    pub fn with_contribution(mut self, amount: Money, interval: ContributionInterval) -> Self {
        self.contribution_amount = Some(amount);
        self.contribution_interval = Some(interval);
        self
    }

    pub fn with_leave_date(mut self, leave_date: NaiveDate) -> Self {
        self.leave_date = Some(leave_date);
        self.status = MemberStatus::Left;
        self
    }

    pub fn with_next_due_date(mut self, next_due_date: NaiveDate) -> Self {
        self.next_due_date = Some(next_due_date);
        self
    }

    /// billing terms, none unless both amount and interval are set
    pub fn billing(&self) -> Option<BillingTerms> {
        match (self.contribution_amount, self.contribution_interval) {
            (Some(amount), Some(interval)) => Some(BillingTerms { amount, interval }),
            _ => None,
        }
    }

    /// date billing starts from: join date, or a later operator override
    pub fn billing_anchor(&self) -> NaiveDate {
        match self.next_due_date {
            Some(override_date) if override_date > self.join_date => override_date,
            _ => self.join_date,
        }
    }

    /// case-insensitive substring match on the member name
    pub fn matches_filter(&self, filter: &str) -> bool {
        let needle = filter.trim().to_lowercase();
        needle.is_empty() || self.name.to_lowercase().contains(&needle)
    }
}
