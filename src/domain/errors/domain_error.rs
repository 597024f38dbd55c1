//! # Domain Errors
//!
//! Typed domain error definitions.
//!
//! This module provides the [`DomainError`] enum for representing
//! domain-level errors with numeric error codes.
//!
//! # Error Code Ranges
//!
//! - **1000-1999**: Validation errors
//! - **2000-2999**: State errors
//! - **3000-3999**: Pricing errors
//! - **4000-4999**: Arithmetic errors
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::errors::DomainError;
//!
//! let error = DomainError::RateNotFound("PILOTAGE at HAIPHONG".to_string());
//! assert_eq!(error.code(), 3001);
//! assert_eq!(error.category(), "pricing");
//! ```

use crate::domain::value_objects::arithmetic::ArithmeticError;
use crate::domain::value_objects::quote_status::QuoteStatus;
use thiserror::Error;

/// Domain-level error with numeric error codes.
///
/// Provides typed errors for domain operations with consistent
/// error codes for logging and API responses.
///
/// # Error Code Ranges
///
/// | Range | Category |
/// |-------|----------|
/// | 1000-1999 | Validation errors |
/// | 2000-2999 | State errors |
/// | 3000-3999 | Pricing errors |
/// | 4000-4999 | Arithmetic errors |
///
/// Pricing errors are the per-rule failures of the calculation engine:
/// they fail a single calculation step (recorded as skipped) and never
/// abort the surrounding orchestration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (1000-1999)
    // ========================================================================
    /// Invalid monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid rate or coefficient value.
    #[error("invalid rate: {0}")]
    InvalidRate(String),

    /// Malformed formula configuration, caught at rule load time.
    #[error("invalid formula: {0}")]
    InvalidFormula(String),

    /// Invalid currency code.
    #[error("invalid currency: {0}")]
    InvalidCurrency(String),

    /// Invalid validity window (e.g. `valid_to` before `valid_from`).
    #[error("invalid validity window: {0}")]
    InvalidValidityWindow(String),

    /// A fee rule with this code already exists.
    #[error("duplicate rule code: {0}")]
    DuplicateRuleCode(String),

    /// Generic validation error.
    #[error("validation error: {0}")]
    ValidationError(String),

    // ========================================================================
    // State Errors (2000-2999)
    // ========================================================================
    /// Invalid quotation state transition attempted.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// The current status.
        from: QuoteStatus,
        /// The attempted target status.
        to: QuoteStatus,
    },

    /// Recalculation attempted on a quotation past draft.
    #[error("quotation not recalculable: {0}")]
    NotRecalculable(String),

    /// Customer response attempted after the validity window elapsed.
    #[error("quotation expired: {0}")]
    QuotationExpired(String),

    /// Estimate conversion attempted twice.
    #[error("estimate already converted: {0}")]
    AlreadyConverted(String),

    /// Operation not allowed in the current state.
    #[error("operation not allowed: {0}")]
    OperationNotAllowed(String),

    // ========================================================================
    // Pricing Errors (3000-3999)
    // ========================================================================
    /// No rate table entry matched the lookup.
    #[error("rate not found: {0}")]
    RateNotFound(String),

    /// A formula referenced an input the request did not supply.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// An expression referenced an identifier that is not an input.
    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// Formula evaluation failed.
    #[error("formula evaluation failed: {0}")]
    FormulaEvaluation(String),

    /// Nested formula evaluation exceeded the configured depth bound.
    #[error("formula nesting exceeds depth limit of {0}")]
    EvaluationDepthExceeded(usize),

    /// The rule selector produced an empty set for the request.
    #[error("no pricing available: {0}")]
    NoApplicableRules(String),

    /// An expired, unconverted estimate cannot be converted.
    #[error("estimate expired, please recalculate: {0}")]
    EstimateExpired(String),

    /// A manual price override requires a reason.
    #[error("price override requires a reason")]
    OverrideWithoutReason,

    // ========================================================================
    // Arithmetic Errors (4000-4999)
    // ========================================================================
    /// Arithmetic overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Arithmetic underflow.
    #[error("arithmetic underflow")]
    Underflow,

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Invalid arithmetic value.
    #[error("invalid arithmetic value: {0}")]
    InvalidArithmeticValue(String),
}

impl DomainError {
    /// Returns the numeric error code.
    ///
    /// # Examples
    ///
    /// ```
    /// use seaquote::domain::errors::DomainError;
    ///
    /// assert_eq!(DomainError::InvalidFormula("empty".to_string()).code(), 1003);
    /// assert_eq!(DomainError::DivisionByZero.code(), 4003);
    /// ```
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            // Validation errors (1000-1999)
            Self::InvalidAmount(_) => 1001,
            Self::InvalidRate(_) => 1002,
            Self::InvalidFormula(_) => 1003,
            Self::InvalidCurrency(_) => 1004,
            Self::InvalidValidityWindow(_) => 1005,
            Self::DuplicateRuleCode(_) => 1006,
            Self::ValidationError(_) => 1099,

            // State errors (2000-2999)
            Self::InvalidStateTransition { .. } => 2001,
            Self::NotRecalculable(_) => 2002,
            Self::QuotationExpired(_) => 2003,
            Self::AlreadyConverted(_) => 2004,
            Self::OperationNotAllowed(_) => 2099,

            // Pricing errors (3000-3999)
            Self::RateNotFound(_) => 3001,
            Self::MissingInput(_) => 3002,
            Self::UnknownIdentifier(_) => 3003,
            Self::FormulaEvaluation(_) => 3004,
            Self::EvaluationDepthExceeded(_) => 3005,
            Self::NoApplicableRules(_) => 3006,
            Self::EstimateExpired(_) => 3007,
            Self::OverrideWithoutReason => 3008,

            // Arithmetic errors (4000-4999)
            Self::Overflow => 4001,
            Self::Underflow => 4002,
            Self::DivisionByZero => 4003,
            Self::InvalidArithmeticValue(_) => 4004,
        }
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.code() {
            1000..=1999 => "validation",
            2000..=2999 => "state",
            3000..=3999 => "pricing",
            4000..=4999 => "arithmetic",
            _ => "unknown",
        }
    }

    /// Returns true if this is a validation error.
    #[inline]
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self.code(), 1000..=1999)
    }

    /// Returns true if this is a state error.
    #[inline]
    #[must_use]
    pub const fn is_state_error(&self) -> bool {
        matches!(self.code(), 2000..=2999)
    }

    /// Returns true if this is a pricing error.
    #[inline]
    #[must_use]
    pub const fn is_pricing_error(&self) -> bool {
        matches!(self.code(), 3000..=3999)
    }

    /// Returns true if this is an arithmetic error.
    #[inline]
    #[must_use]
    pub const fn is_arithmetic_error(&self) -> bool {
        matches!(self.code(), 4000..=4999)
    }

    /// Returns true if the failure is local to a single calculation
    /// step.
    ///
    /// Local failures are recorded as skipped steps and never abort the
    /// surrounding orchestration.
    #[must_use]
    pub const fn is_step_local(&self) -> bool {
        self.is_pricing_error() && !matches!(self, Self::NoApplicableRules(_))
            || self.is_arithmetic_error()
    }
}

impl From<ArithmeticError> for DomainError {
    fn from(err: ArithmeticError) -> Self {
        match err {
            ArithmeticError::Overflow => Self::Overflow,
            ArithmeticError::Underflow => Self::Underflow,
            ArithmeticError::DivisionByZero => Self::DivisionByZero,
            ArithmeticError::InvalidValue(msg) => Self::InvalidArithmeticValue(msg.to_string()),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod error_codes {
        use super::*;

        #[test]
        fn validation_errors_in_range() {
            let errors = [
                DomainError::InvalidAmount("test".to_string()),
                DomainError::InvalidRate("test".to_string()),
                DomainError::InvalidFormula("test".to_string()),
                DomainError::InvalidCurrency("test".to_string()),
                DomainError::InvalidValidityWindow("test".to_string()),
                DomainError::DuplicateRuleCode("test".to_string()),
                DomainError::ValidationError("test".to_string()),
            ];

            for error in errors {
                assert!(error.is_validation_error(), "{error}");
                assert_eq!(error.category(), "validation");
            }
        }

        #[test]
        fn state_errors_in_range() {
            let errors = [
                DomainError::InvalidStateTransition {
                    from: QuoteStatus::Draft,
                    to: QuoteStatus::Accepted,
                },
                DomainError::NotRecalculable("test".to_string()),
                DomainError::QuotationExpired("test".to_string()),
                DomainError::AlreadyConverted("test".to_string()),
                DomainError::OperationNotAllowed("test".to_string()),
            ];

            for error in errors {
                assert!(error.is_state_error(), "{error}");
                assert_eq!(error.category(), "state");
            }
        }

        #[test]
        fn pricing_errors_in_range() {
            let errors = [
                DomainError::RateNotFound("test".to_string()),
                DomainError::MissingInput("test".to_string()),
                DomainError::UnknownIdentifier("test".to_string()),
                DomainError::FormulaEvaluation("test".to_string()),
                DomainError::EvaluationDepthExceeded(16),
                DomainError::NoApplicableRules("test".to_string()),
                DomainError::EstimateExpired("test".to_string()),
                DomainError::OverrideWithoutReason,
            ];

            for error in errors {
                assert!(error.is_pricing_error(), "{error}");
                assert_eq!(error.category(), "pricing");
            }
        }

        #[test]
        fn arithmetic_errors_in_range() {
            let errors = [
                DomainError::Overflow,
                DomainError::Underflow,
                DomainError::DivisionByZero,
                DomainError::InvalidArithmeticValue("test".to_string()),
            ];

            for error in errors {
                assert!(error.is_arithmetic_error(), "{error}");
                assert_eq!(error.category(), "arithmetic");
            }
        }
    }

    mod step_locality {
        use super::*;

        #[test]
        fn per_rule_failures_are_step_local() {
            assert!(DomainError::RateNotFound("x".to_string()).is_step_local());
            assert!(DomainError::MissingInput("grt".to_string()).is_step_local());
            assert!(DomainError::UnknownIdentifier("foo".to_string()).is_step_local());
            assert!(DomainError::DivisionByZero.is_step_local());
            assert!(DomainError::EvaluationDepthExceeded(16).is_step_local());
        }

        #[test]
        fn no_applicable_rules_is_not_step_local() {
            assert!(!DomainError::NoApplicableRules("x".to_string()).is_step_local());
        }

        #[test]
        fn validation_and_state_errors_are_not_step_local() {
            assert!(!DomainError::InvalidFormula("x".to_string()).is_step_local());
            assert!(!DomainError::OperationNotAllowed("x".to_string()).is_step_local());
        }
    }

    mod display {
        use super::*;

        #[test]
        fn state_transition_error_display() {
            let error = DomainError::InvalidStateTransition {
                from: QuoteStatus::Draft,
                to: QuoteStatus::Accepted,
            };
            assert_eq!(
                error.to_string(),
                "invalid state transition from DRAFT to ACCEPTED"
            );
        }

        #[test]
        fn estimate_expired_mentions_recalculation() {
            let error = DomainError::EstimateExpired("EST-1".to_string());
            assert!(error.to_string().contains("please recalculate"));
        }
    }

    mod from_arithmetic_error {
        use super::*;

        #[test]
        fn variants_convert() {
            assert_eq!(
                DomainError::from(ArithmeticError::Overflow),
                DomainError::Overflow
            );
            assert_eq!(
                DomainError::from(ArithmeticError::DivisionByZero),
                DomainError::DivisionByZero
            );
            assert_eq!(
                DomainError::from(ArithmeticError::InvalidValue("negative")),
                DomainError::InvalidArithmeticValue("negative".to_string())
            );
        }
    }
}
