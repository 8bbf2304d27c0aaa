use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar::ContributionInterval;
use crate::decimal::Money;
use crate::types::MemberId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DuesError {
    #[error("invalid period format: {input:?} is not a valid period key for {interval}")]
    InvalidPeriodFormat {
        input: String,
        interval: String,
    },

    #[error("invalid period: {period} does not belong to the {interval} calendar")]
    InvalidPeriod {
        period: String,
        interval: ContributionInterval,
    },

    #[error("interval mismatch: cannot compare {left} with {right}")]
    IntervalMismatch {
        left: String,
        right: String,
    },

    #[error("member not found: {member_id}")]
    MemberNotFound {
        member_id: MemberId,
    },

    #[error("no billing configured for member {member_id}")]
    NoBillingConfigured {
        member_id: MemberId,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange {
        from: NaiveDate,
        to: NaiveDate,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },
}

impl DuesError {
    /// malformed period text for a known interval
    pub(crate) fn invalid_format(input: &str, interval: ContributionInterval) -> Self {
        DuesError::InvalidPeriodFormat {
            input: input.to_string(),
            interval: interval.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DuesError>;
