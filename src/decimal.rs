use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

/// decimal places kept for stored amounts (paise)
pub const MONEY_DP: u32 = 2;

/// Money type with 2 decimal places precision
///
/// Addition and rate application saturate at `Money::MAX` instead of
/// overflowing, so long-unpaid loans compound up to the cap and stop there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    /// largest representable amount
    pub const MAX: Money = Money(Decimal::MAX);

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(MONEY_DP))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s.trim())?.round_dp(MONEY_DP)))
    }

    /// create from whole currency units (rupees)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor units (paise)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, MONEY_DP))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to the nearest whole unit, halves away from zero
    pub fn round_to_unit(&self) -> Self {
        Money(self.0.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }

    /// check if zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// check if strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// check if strictly negative
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// minimum of two values
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// maximum of two values
    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// apply a fractional rate (0.02 for 2%) without rounding to whole units
    pub fn apply_rate(&self, rate: Rate) -> Self {
        let product = self
            .0
            .checked_mul(rate.as_decimal())
            .unwrap_or_else(|| saturated(self.0.is_sign_negative() != rate.as_decimal().is_sign_negative()));
        Money::from_decimal(product)
    }

    /// add, clamping at the representable range
    pub fn saturating_add(self, other: Money) -> Money {
        let sum = self
            .0
            .checked_add(other.0)
            .unwrap_or_else(|| saturated(self.0.is_sign_negative()));
        Money(sum.round_dp(MONEY_DP))
    }

    /// subtract, flooring the result at zero
    pub fn saturating_sub(self, other: Money) -> Money {
        (self - other).max(Money::ZERO)
    }
}

fn saturated(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        self.saturating_add(other)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        *self = self.saturating_add(other);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(MONEY_DP))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(MONEY_DP);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

/// rate type for interest and penalty rates, stored as a fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal (e.g., 0.02 for 2%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from whole percentage (e.g., 2 for 2%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// create from a possibly fractional or negative percentage (e.g., 2.5 for 2.5%)
    pub fn from_percentage_decimal(p: Decimal) -> Self {
        Rate(p / Decimal::from(100))
    }

    /// get as decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// get as percentage
    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    /// check if strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// check if strictly negative
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.125").unwrap();
        assert_eq!(m.to_string(), "100.12"); // banker's rounding at 2 places

        let p = Money::from_minor(250);
        assert_eq!(p, Money::from_str_exact("2.50").unwrap());
    }

    #[test]
    fn test_round_to_unit_midpoint() {
        assert_eq!(Money::from_decimal(dec!(20.5)).round_to_unit(), Money::from_major(21));
        assert_eq!(Money::from_decimal(dec!(21.5)).round_to_unit(), Money::from_major(22));
        assert_eq!(Money::from_decimal(dec!(20.49)).round_to_unit(), Money::from_major(20));
        assert_eq!(Money::from_decimal(dec!(20.4)).round_to_unit(), Money::from_major(20));
    }

    #[test]
    fn test_apply_rate() {
        let due = Money::from_major(1_020);
        let rate = Rate::from_percentage(2);

        assert_eq!(due.apply_rate(rate), Money::from_str_exact("20.40").unwrap());
        assert_eq!(due.apply_rate(rate).round_to_unit(), Money::from_major(20));
    }

    #[test]
    fn test_saturating_sub() {
        let due = Money::from_major(100);
        assert_eq!(due.saturating_sub(Money::from_major(30)), Money::from_major(70));
        assert_eq!(due.saturating_sub(Money::from_major(130)), Money::ZERO);
    }

    #[test]
    fn test_saturating_arithmetic() {
        let near_max = Money::MAX - Money::from_major(10);
        assert_eq!(near_max + Money::from_major(25), Money::MAX);
        assert_eq!(Money::MAX.apply_rate(Rate::from_percentage(100)), Money::MAX);
        assert!(Money::MAX.apply_rate(Rate::from_percentage(2)) < Money::MAX);

        let mut due = Money::from_major(40);
        due += Money::from_minor(125);
        assert_eq!(due, Money::from_str_exact("41.25").unwrap());
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [Money::from_major(10), Money::from_minor(550), Money::from_major(4)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_str_exact("19.50").unwrap());
    }

    #[test]
    fn test_rate_from_percentage() {
        assert_eq!(Rate::from_percentage(2).as_decimal(), dec!(0.02));
        assert_eq!(Rate::from_percentage_decimal(dec!(2.5)).as_decimal(), dec!(0.025));
        assert!(Rate::from_percentage_decimal(dec!(-1)).is_negative());
        assert!(!Rate::ZERO.is_positive());
        assert_eq!(Rate::from_percentage(2).to_string(), "2%");
    }
}
