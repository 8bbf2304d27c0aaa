use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{DuesError, Result};

/// dues engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuesConfig {
    pub matching: MatchingConfig,
    pub timeline: TimelineConfig,
    pub ledger: LedgerConfig,
}

/// transaction suggestion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// days searched before a period's window start
    pub look_back_days: u32,
    /// days searched after a period's window end
    pub grace_days: u32,
    /// largest difference still counted as an amount match
    pub amount_tolerance: Money,
    /// largest difference accepted without an amount mismatch warning
    pub mismatch_threshold: Money,
    pub max_suggestions: usize,
    /// name similarity at or above which a description counts as naming the member
    pub min_name_similarity: Rate,
}

/// longest stretch a timeline shows on either side of the current period
pub const MAX_TIMELINE_YEARS: u32 = 10;

/// default display window for timelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub past_periods: u32,
    pub future_periods: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub default_history_limit: usize,
}

impl DuesConfig {
    /// standard settings: 90-day look-back, cent tolerance
    pub fn standard() -> Self {
        Self {
            matching: MatchingConfig {
                look_back_days: 90,
                grace_days: 10,
                amount_tolerance: Money::CENT,
                mismatch_threshold: Money::CENT,
                max_suggestions: 20,
                min_name_similarity: Rate::from_percentage(50),
            },
            timeline: TimelineConfig {
                past_periods: 6,
                future_periods: 3,
            },
            ledger: LedgerConfig {
                default_history_limit: 12,
            },
        }
    }

    /// wider search for clubs that collect dues irregularly
    pub fn lenient() -> Self {
        Self {
            matching: MatchingConfig {
                look_back_days: 180,
                grace_days: 31,
                amount_tolerance: Money::ONE,
                mismatch_threshold: Money::ONE,
                max_suggestions: 50,
                min_name_similarity: Rate::from_decimal(dec!(0.34)),
            },
            timeline: TimelineConfig {
                past_periods: 12,
                future_periods: 3,
            },
            ledger: LedgerConfig {
                default_history_limit: 24,
            },
        }
    }

    /// load and validate configuration from json
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DuesConfig =
            serde_json::from_str(json).map_err(|e| DuesError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let matching = &self.matching;
        if matching.look_back_days > 3_660 {
            return Err(invalid(format!(
                "look_back_days {} exceeds ten years",
                matching.look_back_days
            )));
        }
        if matching.grace_days > 366 {
            return Err(invalid(format!("grace_days {} exceeds one year", matching.grace_days)));
        }
        if matching.amount_tolerance.is_negative() {
            return Err(invalid("amount_tolerance must not be negative".to_string()));
        }
        if matching.mismatch_threshold.is_negative() {
            return Err(invalid("mismatch_threshold must not be negative".to_string()));
        }
        if matching.max_suggestions == 0 {
            return Err(invalid("max_suggestions must be at least 1".to_string()));
        }
        let similarity = matching.min_name_similarity.as_decimal();
        if similarity < Decimal::ZERO || similarity > Decimal::ONE {
            return Err(invalid(format!(
                "min_name_similarity {} outside 0..=1",
                similarity
            )));
        }
        let max_periods = MAX_TIMELINE_YEARS * 12;
        for (name, periods) in [
            ("past_periods", self.timeline.past_periods),
            ("future_periods", self.timeline.future_periods),
        ] {
            if periods > max_periods {
                return Err(invalid(format!(
                    "{} {} exceeds {} periods",
                    name, periods, max_periods
                )));
            }
        }
        if self.ledger.default_history_limit == 0 {
            return Err(invalid("default_history_limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for DuesConfig {
    fn default() -> Self {
        Self::standard()
    }
}

fn invalid(message: String) -> DuesError {
    DuesError::InvalidConfiguration { message }
}
