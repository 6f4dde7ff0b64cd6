//! Non-negative monetary amounts backed by decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone)]
pub enum MoneyError {
    /// The amount is negative.
    #[error("money amount cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input string is not a valid decimal number.
    #[error("invalid money amount: {0}")]
    InvalidAmount(String),
}

/// A non-negative monetary amount in the store currency.
///
/// Prices, totals, and rates all use decimal arithmetic so that cent-level
/// amounts are exact. Rounding happens only at the point of display or
/// persistence via [`Money::round2`], never at intermediate steps.
///
/// ## Examples
///
/// ```
/// use luxe_core::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::new(Decimal::new(2999, 2)).unwrap(); // 29.99
/// assert_eq!(price.to_string(), "29.99");
///
/// // Negative amounts are rejected
/// assert!(Money::new(Decimal::new(-1, 2)).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Money` value from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Parse a `Money` value from a decimal string (e.g. `"9.99"`).
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::InvalidAmount`] if the string is not a decimal
    /// number, or [`MoneyError::Negative`] if it is below zero.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|_| MoneyError::InvalidAmount(s.to_owned()))?;
        Self::new(amount)
    }

    /// Create a `Money` value from a whole number of cents.
    ///
    /// Infallible: the input is unsigned, so the amount is never negative.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Round to two decimal places, half-up.
    #[must_use]
    pub fn round2(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Multiply by a unit count (line total = unit price x quantity).
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::str::FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    #[test]
    fn test_new_rejects_negative() {
        let result = Money::new(Decimal::new(-100, 2));
        assert!(matches!(result, Err(MoneyError::Negative(_))));
    }

    #[test]
    fn test_new_accepts_zero() {
        assert_eq!(Money::new(Decimal::ZERO).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(money("29.99").amount(), Decimal::new(2999, 2));
        assert_eq!(money(" 0 ").amount(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            Money::parse("not-a-number"),
            Err(MoneyError::InvalidAmount(_))
        ));
        assert!(matches!(
            Money::parse("-9.99"),
            Err(MoneyError::Negative(_))
        ));
    }

    #[test]
    fn test_round2_half_up() {
        // 20.7976 rounds up to 20.80
        assert_eq!(money("20.7976").round2(), money("20.80"));
        // Midpoint rounds away from zero
        assert_eq!(money("1.005").round2(), money("1.01"));
        assert_eq!(money("1.004").round2(), money("1.00"));
    }

    #[test]
    fn test_times() {
        assert_eq!(money("29.99").times(2), money("59.98"));
        assert_eq!(money("29.99").times(0), Money::ZERO);
    }

    #[test]
    fn test_sum() {
        let total: Money = [money("59.98"), money("199.99")].into_iter().sum();
        assert_eq!(total, money("259.97"));
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(money("5").to_string(), "5.00");
        assert_eq!(money("9.99").to_string(), "9.99");
    }

    #[test]
    fn test_serde_rejects_negative() {
        let result: Result<Money, _> = serde_json::from_str("\"-1.00\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let price = money("199.99");
        let json = serde_json::to_string(&price).unwrap();
        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }
}
