use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{ContributionInterval, PeriodKey};
use crate::decimal::Money;
use crate::types::{MemberId, VoucherId};

/// persisted payment of one member for one period
///
/// At most one record exists per `(member_id, period_key)`. `voucher_id` is a
/// weak reference into the accounting store and may go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub member_id: MemberId,
    pub period_key: PeriodKey,
    pub interval: ContributionInterval,
    pub amount: Money,
    pub date_paid: DateTime<Utc>,
    pub voucher_id: Option<VoucherId>,
    /// true when the payment is backed by a linked transaction
    pub verified: bool,
}

impl PaymentRecord {
    pub fn is_linked(&self) -> bool {
        self.voucher_id.is_some()
    }
}

/// mark-paid request as received from the caller
///
/// The amount is trusted as given; divergence from the schedule is reported,
/// not corrected.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkPaidRequest {
    pub member_id: MemberId,
    /// period key text, validated against `interval`
    pub period: String,
    pub interval: ContributionInterval,
    pub amount: Money,
    pub voucher_id: Option<VoucherId>,
}

impl MarkPaidRequest {
    pub fn new(
        member_id: MemberId,
        period: impl Into<String>,
        interval: ContributionInterval,
        amount: Money,
    ) -> Self {
        Self {
            member_id,
            period: period.into(),
            interval,
            amount,
            voucher_id: None,
        }
    }

    /// link the payment to an accounting transaction; blank ids are ignored
    pub fn with_voucher(mut self, voucher_id: impl Into<VoucherId>) -> Self {
        let voucher_id = voucher_id.into();
        self.voucher_id = if voucher_id.trim().is_empty() {
            None
        } else {
            Some(voucher_id)
        };
        self
    }
}
