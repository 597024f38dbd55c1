//! # Checked Arithmetic & Rounding Policy
//!
//! Traits and utilities for safe monetary arithmetic.
//!
//! This module provides:
//! - [`ArithmeticError`] - Error type for arithmetic failures
//! - [`CheckedArithmetic`] - Trait for safe arithmetic operations
//! - [`round_money`] / [`round_rate`] - The crate-wide rounding policy
//!
//! All monetary amounts are rounded to 2 decimal places, all rates and
//! coefficients to 6 decimal places, both half-up (midpoint away from
//! zero). Intermediates are rounded before being folded into further
//! arithmetic so results are reproducible regardless of evaluation order.
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::value_objects::arithmetic::{round_money, CheckedArithmetic};
//! use rust_decimal::Decimal;
//!
//! let a = Decimal::new(1005, 3); // 1.005
//! assert_eq!(round_money(a).to_string(), "1.01");
//!
//! let b = Decimal::new(100, 0);
//! assert!(b.safe_div(Decimal::ZERO).is_err());
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Decimal places carried by monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Decimal places carried by rates and coefficients.
pub const RATE_SCALE: u32 = 6;

/// Error type for arithmetic operations.
///
/// Represents failures that can occur during checked arithmetic,
/// including overflow, underflow, division by zero, and invalid values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// Arithmetic operation resulted in overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Arithmetic operation resulted in underflow.
    #[error("arithmetic underflow")]
    Underflow,

    /// Division by zero attempted.
    #[error("division by zero")]
    DivisionByZero,

    /// Invalid value provided (e.g., negative when non-negative required).
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
}

/// Result type for arithmetic operations.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

/// Rounds a monetary amount to 2 decimal places, half-up.
///
/// # Examples
///
/// ```
/// use seaquote::domain::value_objects::arithmetic::round_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_money(Decimal::new(1235, 3)).to_string(), "1.24");
/// assert_eq!(round_money(Decimal::new(1234, 3)).to_string(), "1.23");
/// ```
#[inline]
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a rate or coefficient to 6 decimal places, half-up.
///
/// Applied to every intermediate factor before it is folded into
/// further arithmetic.
#[inline]
#[must_use]
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Trait for checked arithmetic operations.
///
/// Provides safe arithmetic methods that return `Result` instead of
/// panicking on overflow, underflow, or division by zero.
pub trait CheckedArithmetic: Sized {
    /// Safely add two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the result would overflow.
    fn safe_add(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Safely subtract two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Underflow` if the result would underflow.
    fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Safely multiply two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the result would overflow.
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Safely divide two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::DivisionByZero` if the divisor is zero.
    fn safe_div(self, rhs: Self) -> ArithmeticResult<Self>;
}

impl CheckedArithmetic for Decimal {
    #[inline]
    fn safe_add(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_add(rhs).ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_sub(rhs).ok_or(ArithmeticError::Underflow)
    }

    #[inline]
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_mul(rhs).ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    fn safe_div(self, rhs: Self) -> ArithmeticResult<Self> {
        if rhs.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        self.checked_div(rhs).ok_or(ArithmeticError::Overflow)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    mod rounding {
        use super::*;

        #[test]
        fn round_money_half_up() {
            assert_eq!(round_money(dec("1.005")), dec("1.01"));
            assert_eq!(round_money(dec("1.004")), dec("1.00"));
            assert_eq!(round_money(dec("1.234")), dec("1.23"));
            assert_eq!(round_money(dec("1.235")), dec("1.24"));
        }

        #[test]
        fn round_money_negative_half_up_away_from_zero() {
            assert_eq!(round_money(dec("-1.005")), dec("-1.01"));
        }

        #[test]
        fn round_rate_six_places() {
            assert_eq!(round_rate(dec("0.12345650")), dec("0.123457"));
            assert_eq!(round_rate(dec("0.1234564")), dec("0.123456"));
        }

        #[test]
        fn round_money_is_idempotent() {
            let v = round_money(dec("42.555"));
            assert_eq!(round_money(v), v);
        }
    }

    mod checked_arithmetic_decimal {
        use super::*;

        #[test]
        fn safe_add_works() {
            assert_eq!(dec("100").safe_add(dec("50")).unwrap(), dec("150"));
        }

        #[test]
        fn safe_sub_works() {
            assert_eq!(dec("100").safe_sub(dec("50")).unwrap(), dec("50"));
        }

        #[test]
        fn safe_mul_works() {
            assert_eq!(dec("10").safe_mul(dec("5")).unwrap(), dec("50"));
        }

        #[test]
        fn safe_div_works() {
            assert_eq!(dec("100").safe_div(dec("5")).unwrap(), dec("20"));
        }

        #[test]
        fn safe_div_by_zero_fails() {
            assert_eq!(
                dec("100").safe_div(Decimal::ZERO),
                Err(ArithmeticError::DivisionByZero)
            );
        }

        #[test]
        fn safe_mul_overflow_fails() {
            assert_eq!(
                Decimal::MAX.safe_mul(dec("2")),
                Err(ArithmeticError::Overflow)
            );
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn display_formats_correctly() {
            assert_eq!(ArithmeticError::Overflow.to_string(), "arithmetic overflow");
            assert_eq!(
                ArithmeticError::DivisionByZero.to_string(),
                "division by zero"
            );
            assert_eq!(
                ArithmeticError::InvalidValue("negative").to_string(),
                "invalid value: negative"
            );
        }
    }
}
