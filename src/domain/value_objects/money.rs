//! # Monetary Value Objects
//!
//! Fixed-point money, rates and currency codes.
//!
//! This module provides [`Money`] (a non-negative amount carried at
//! exactly 2 decimal places), [`Rate`] (a non-negative coefficient
//! carried at exactly 6 decimal places) and [`Currency`] (a 3-letter
//! ISO-style code). Construction normalizes scale, so every value that
//! crosses a boundary already satisfies the crate rounding policy.
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::value_objects::money::{Currency, Money, Rate};
//! use rust_decimal::Decimal;
//!
//! let amount = Money::new(Decimal::new(3399995, 3)).unwrap();
//! assert_eq!(amount.to_string(), "3400.00");
//!
//! let rate = Rate::new(Decimal::new(15, 2)).unwrap();
//! assert_eq!(rate.get().to_string(), "0.150000");
//!
//! let usd = Currency::usd();
//! assert_eq!(usd.code(), "USD");
//! ```

use super::arithmetic::{
    ArithmeticError, ArithmeticResult, CheckedArithmetic, MONEY_SCALE, RATE_SCALE, round_money,
    round_rate,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A non-negative monetary amount at exactly 2 decimal places.
///
/// Construction rounds half-up to 2 decimal places and rejects negative
/// values. Arithmetic is checked and re-rounds, so a `Money` value can
/// never drift away from the currency scale.
///
/// # Invariants
///
/// - Amount is always >= 0
/// - Scale is always exactly 2
///
/// # Examples
///
/// ```
/// use seaquote::domain::value_objects::money::Money;
/// use rust_decimal::Decimal;
///
/// let a = Money::new(Decimal::new(10050, 2)).unwrap();
/// let b = Money::new(Decimal::new(5025, 2)).unwrap();
/// assert_eq!(a.safe_add(b).unwrap().to_string(), "150.75");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero amount constant.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new amount, rounding half-up to 2 decimal places.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::InvalidValue` if the value is negative.
    pub fn new(value: Decimal) -> ArithmeticResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ArithmeticError::InvalidValue("amount cannot be negative"));
        }
        let mut rounded = round_money(value);
        rounded.rescale(MONEY_SCALE);
        Ok(Self(rounded))
    }

    /// Creates a zero amount.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Returns the inner decimal value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive.
    #[inline]
    #[must_use]
    pub fn is_positive(self) -> bool {
        !self.0.is_zero()
    }

    /// Safely adds another amount, re-rounding to the currency scale.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the result would overflow.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn safe_add(self, rhs: Self) -> ArithmeticResult<Self> {
        Self::new(self.0.safe_add(rhs.0)?)
    }

    /// Safely subtracts another amount.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Underflow` if the result would be negative.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self> {
        let result = self.0.safe_sub(rhs.0)?;
        if result.is_sign_negative() {
            return Err(ArithmeticError::Underflow);
        }
        Self::new(result)
    }

    /// Safely multiplies by a factor, rounding the result to the
    /// currency scale.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` on overflow and
    /// `ArithmeticError::InvalidValue` if the result would be negative.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn safe_mul(self, factor: Decimal) -> ArithmeticResult<Self> {
        let result = self.0.safe_mul(factor)?;
        if result.is_sign_negative() {
            return Err(ArithmeticError::InvalidValue(
                "multiplication result cannot be negative",
            ));
        }
        Self::new(result)
    }

    /// Returns the smaller of two amounts.
    #[inline]
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }

    /// Returns the larger of two amounts.
    #[inline]
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if self.0 >= other.0 { self } else { other }
    }
}

impl TryFrom<Decimal> for Money {
    type Error = ArithmeticError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A non-negative rate or coefficient at exactly 6 decimal places.
///
/// Rates crossing the administrative boundary carry 6 fractional digits;
/// construction rounds half-up and normalizes scale.
///
/// # Examples
///
/// ```
/// use seaquote::domain::value_objects::money::Rate;
/// use rust_decimal::Decimal;
///
/// let rate = Rate::new(Decimal::new(25, 3)).unwrap();
/// assert_eq!(rate.get().to_string(), "0.025000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Rate(Decimal);

impl Rate {
    /// Zero rate constant.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new rate, rounding half-up to 6 decimal places.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::InvalidValue` if the value is negative.
    pub fn new(value: Decimal) -> ArithmeticResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ArithmeticError::InvalidValue("rate cannot be negative"));
        }
        let mut rounded = round_rate(value);
        rounded.rescale(RATE_SCALE);
        Ok(Self(rounded))
    }

    /// Returns the inner decimal value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> Decimal {
        self.0
    }

    /// Returns true if the rate is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Rate {
    type Error = ArithmeticError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rate> for Decimal {
    fn from(rate: Rate) -> Self {
        rate.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A 3-letter currency code.
///
/// # Examples
///
/// ```
/// use seaquote::domain::value_objects::money::Currency;
///
/// let usd: Currency = "usd".parse().unwrap();
/// assert_eq!(usd.code(), "USD");
/// assert!("US".parse::<Currency>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Creates a currency from a 3-letter alphabetic code.
    ///
    /// The code is upper-cased.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::InvalidValue` if the code is not exactly
    /// three ASCII letters.
    pub fn new(code: &str) -> ArithmeticResult<Self> {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ArithmeticError::InvalidValue(
                "currency code must be three letters",
            ));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// The US dollar, the platform's default quoting currency.
    #[must_use]
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Returns the upper-case code.
    #[inline]
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl FromStr for Currency {
    type Err = ArithmeticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = ArithmeticError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    mod money {
        use super::*;

        #[test]
        fn new_rounds_half_up_to_two_places() {
            assert_eq!(Money::new(dec("1.005")).unwrap().to_string(), "1.01");
            assert_eq!(Money::new(dec("1.004")).unwrap().to_string(), "1.00");
        }

        #[test]
        fn new_pads_scale() {
            assert_eq!(Money::new(dec("3400")).unwrap().to_string(), "3400.00");
        }

        #[test]
        fn new_rejects_negative() {
            assert!(Money::new(dec("-0.01")).is_err());
        }

        #[test]
        fn safe_sub_rejects_negative_result() {
            let a = Money::new(dec("10")).unwrap();
            let b = Money::new(dec("20")).unwrap();
            assert_eq!(a.safe_sub(b), Err(ArithmeticError::Underflow));
        }

        #[test]
        fn safe_mul_rounds_to_currency_scale() {
            let a = Money::new(dec("0.01")).unwrap();
            let product = a.safe_mul(dec("0.34")).unwrap();
            // 0.0034 rounds to 0.00
            assert_eq!(product, Money::ZERO);
        }

        #[test]
        fn ordering_follows_amount() {
            let a = Money::new(dec("1")).unwrap();
            let b = Money::new(dec("2")).unwrap();
            assert!(a < b);
            assert_eq!(a.min(b), a);
            assert_eq!(a.max(b), b);
        }

        #[test]
        fn serde_roundtrip() {
            let amount = Money::new(dec("123.45")).unwrap();
            let json = serde_json::to_string(&amount).unwrap();
            let back: Money = serde_json::from_str(&json).unwrap();
            assert_eq!(amount, back);
        }

        #[test]
        fn serde_rejects_negative() {
            let result: Result<Money, _> = serde_json::from_str("\"-5.00\"");
            assert!(result.is_err());
        }
    }

    mod rate {
        use super::*;

        #[test]
        fn new_normalizes_to_six_places() {
            assert_eq!(Rate::new(dec("0.15")).unwrap().get().to_string(), "0.150000");
        }

        #[test]
        fn new_rounds_half_up() {
            assert_eq!(
                Rate::new(dec("0.0000005")).unwrap().get().to_string(),
                "0.000001"
            );
        }

        #[test]
        fn new_rejects_negative() {
            assert!(Rate::new(dec("-0.1")).is_err());
        }
    }

    mod currency {
        use super::*;

        #[test]
        fn new_uppercases() {
            assert_eq!(Currency::new("vnd").unwrap().code(), "VND");
        }

        #[test]
        fn rejects_bad_length() {
            assert!(Currency::new("US").is_err());
            assert!(Currency::new("USDX").is_err());
        }

        #[test]
        fn rejects_non_alphabetic() {
            assert!(Currency::new("U5D").is_err());
        }

        #[test]
        fn usd_default() {
            assert_eq!(Currency::usd().to_string(), "USD");
        }
    }
}
