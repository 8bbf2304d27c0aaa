use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{DuesError, Result};

/// billing interval of a member's recurring contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionInterval {
    /// one period per calendar month, keys look like `2024-03`
    Monthly,
    /// one period per calendar quarter, keys look like `2024-Q1`
    Quarterly,
    /// one period per calendar year, keys look like `2024`
    Yearly,
}

impl ContributionInterval {
    pub const ALL: [ContributionInterval; 3] = [
        ContributionInterval::Monthly,
        ContributionInterval::Quarterly,
        ContributionInterval::Yearly,
    ];

    /// calendar months covered by one period
    pub fn months_per_period(&self) -> u32 {
        match self {
            ContributionInterval::Monthly => 1,
            ContributionInterval::Quarterly => 3,
            ContributionInterval::Yearly => 12,
        }
    }

    /// periods in one calendar year
    pub fn periods_per_year(&self) -> u32 {
        12 / self.months_per_period()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionInterval::Monthly => "MONTHLY",
            ContributionInterval::Quarterly => "QUARTERLY",
            ContributionInterval::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for ContributionInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContributionInterval {
    type Err = DuesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MONTHLY" | "MONTH" => Ok(ContributionInterval::Monthly),
            "QUARTERLY" | "QUARTER" => Ok(ContributionInterval::Quarterly),
            "YEARLY" | "YEAR" | "ANNUAL" => Ok(ContributionInterval::Yearly),
            _ => Err(DuesError::InvalidConfiguration {
                message: format!("unknown contribution interval {:?}", s),
            }),
        }
    }
}
