use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

/// Money type with cent precision for contribution amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);
    /// one cent, the default reconciliation tolerance
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// number of decimal places kept for currency amounts
    pub const SCALE: u32 = 2;

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(Self::SCALE))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money::from_decimal(Decimal::from_str(s.trim())?))
    }

    /// create from integer amount (dollars, euros, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (cents)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, Self::SCALE))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// absolute value
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// absolute difference between two amounts
    pub fn distance(&self, other: Money) -> Money {
        (*self - other).abs()
    }

    /// true when both amounts agree within `tolerance` (inclusive)
    pub fn within(&self, other: Money, tolerance: Money) -> bool {
        self.distance(other) <= tolerance.abs()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::from_decimal(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(Self::SCALE);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money::from_decimal(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(Self::SCALE);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

/// ratio type for scores and percentages, kept in [0, 1] by the callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);
    pub const ONE: Rate = Rate(Decimal::ONE);

    /// create from decimal (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// ratio of two counts, zero when the denominator is zero
    pub fn from_ratio(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            return Rate::ZERO;
        }
        Rate((Decimal::from(numerator as u64) / Decimal::from(denominator as u64)).round_dp(4))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.as_percentage())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("10.005").unwrap();
        assert_eq!(m.to_string(), "10.00"); // banker's rounding to cents
        assert_eq!(Money::from_str_exact(" 12.5 ").unwrap().to_string(), "12.50");
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Money::from_minor(1), Money::CENT);
        assert_eq!(Money::from_minor(1_050), Money::from_decimal(dec!(10.50)));
    }

    #[test]
    fn test_tolerance_comparison() {
        let due = Money::from_major(10);
        assert!(due.within(Money::from_decimal(dec!(10.01)), Money::CENT));
        assert!(due.within(Money::from_decimal(dec!(9.99)), Money::CENT));
        assert!(!due.within(Money::from_decimal(dec!(10.02)), Money::CENT));
        assert_eq!(due.distance(Money::from_major(12)), Money::from_major(2));
    }

    #[test]
    fn test_sum_and_sign() {
        let total: Money = vec![Money::from_major(10), Money::from_minor(250)].into_iter().sum();
        assert_eq!(total, Money::from_decimal(dec!(12.50)));
        assert!(Money::from_major(-1).is_negative());
        assert!(!Money::ZERO.is_negative());
    }

    #[test]
    fn test_rate_ratio() {
        assert_eq!(Rate::from_ratio(1, 2), Rate::from_percentage(50));
        assert_eq!(Rate::from_ratio(3, 0), Rate::ZERO);
        assert_eq!(Rate::ONE.to_string(), "100.00%");
    }
}
