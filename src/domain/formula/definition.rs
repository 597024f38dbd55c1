//! # Formula Definitions
//!
//! The closed set of fee-formula shapes administrators can configure.
//!
//! A [`Formula`] is a tagged variant with a typed payload per shape,
//! parsed and validated once when a fee rule is loaded — malformed
//! configuration is caught before a rule can be marked active, not at
//! every evaluation.
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::formula::{Formula, FormulaKind};
//! use rust_decimal::Decimal;
//!
//! let formula = Formula::BasePlusVariable {
//!     base: Decimal::new(400, 0),
//!     rate: Decimal::new(15, 2),
//!     variable: "grt".to_string(),
//! };
//!
//! assert!(formula.validate(16).is_ok());
//! assert_eq!(formula.kind(), FormulaKind::BasePlusVariable);
//! ```

use super::condition::ConditionSet;
use super::expression::Expr;
use crate::domain::errors::{DomainError, DomainResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One quantity band of a tiered-pricing formula.
///
/// Bands are ascending; every band except the last carries an upper
/// bound, the last is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBand {
    /// Inclusive upper bound of the band; `None` only for the last band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upto: Option<Decimal>,
    /// Rate applied to the portion of the quantity inside this band.
    pub rate: Decimal,
}

/// One branch of a conditional formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalBranch {
    /// Predicate over the request inputs.
    pub when: ConditionSet,
    /// Sub-formula evaluated when the predicate holds.
    pub then: Formula,
}

/// The shape of a formula, used for reporting and administration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormulaKind {
    /// Constant amount.
    Fixed,
    /// Percentage of one input.
    Percentage,
    /// Rate constant times one or more inputs.
    SimpleMultiplication,
    /// Base constant plus rated variable.
    BasePlusVariable,
    /// Ordered predicate/sub-formula pairs.
    Conditional,
    /// Progressive quantity bands.
    TieredPricing,
    /// Free-form arithmetic expression.
    ComplexFormula,
}

impl fmt::Display for FormulaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "FIXED"),
            Self::Percentage => write!(f, "PERCENTAGE"),
            Self::SimpleMultiplication => write!(f, "SIMPLE_MULTIPLICATION"),
            Self::BasePlusVariable => write!(f, "BASE_PLUS_VARIABLE"),
            Self::Conditional => write!(f, "CONDITIONAL"),
            Self::TieredPricing => write!(f, "TIERED_PRICING"),
            Self::ComplexFormula => write!(f, "COMPLEX_FORMULA"),
        }
    }
}

/// An administrator-configured fee formula.
///
/// Each variant carries exactly the parameters its evaluation needs.
/// Input names are matched case-insensitively against the request's
/// [`ServiceInputs`](crate::domain::value_objects::ServiceInputs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Formula {
    /// A constant amount.
    Fixed {
        /// The amount, in the quotation currency.
        amount: Decimal,
    },

    /// A percentage of one named input: `inputs[base] * percent / 100`.
    Percentage {
        /// The input supplying the base value.
        base_input: String,
        /// The percentage applied (e.g. `10` for 10%).
        percent: Decimal,
    },

    /// A rate constant multiplied by one or more named inputs,
    /// e.g. `rate * GRT * days`.
    SimpleMultiplication {
        /// The rate constant.
        rate: Decimal,
        /// The input names whose values are multiplied in.
        factors: Vec<String>,
    },

    /// `base + inputs[variable] * rate`.
    BasePlusVariable {
        /// The base constant.
        base: Decimal,
        /// The rate applied to the variable.
        rate: Decimal,
        /// The input supplying the variable.
        variable: String,
    },

    /// Ordered (predicate, sub-formula) pairs; the first predicate that
    /// holds selects its sub-formula. With no match, the default
    /// applies, or zero when none is configured.
    Conditional {
        /// The ordered branches.
        branches: Vec<ConditionalBranch>,
        /// Fallback when no branch matches.
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<Box<Formula>>,
    },

    /// Progressive tiering: each band's rate applies only to the
    /// portion of the driving quantity inside that band.
    TieredPricing {
        /// The input supplying the driving quantity.
        input: String,
        /// Ascending bands; the last is open-ended.
        bands: Vec<TierBand>,
    },

    /// A free-form arithmetic expression over named inputs.
    ComplexFormula(Expr),
}

impl Formula {
    /// Returns the formula's shape.
    #[must_use]
    pub const fn kind(&self) -> FormulaKind {
        match self {
            Self::Fixed { .. } => FormulaKind::Fixed,
            Self::Percentage { .. } => FormulaKind::Percentage,
            Self::SimpleMultiplication { .. } => FormulaKind::SimpleMultiplication,
            Self::BasePlusVariable { .. } => FormulaKind::BasePlusVariable,
            Self::Conditional { .. } => FormulaKind::Conditional,
            Self::TieredPricing { .. } => FormulaKind::TieredPricing,
            Self::ComplexFormula(_) => FormulaKind::ComplexFormula,
        }
    }

    /// Validates the formula's configuration.
    ///
    /// Called when a fee rule is loaded or saved, before the rule may be
    /// marked active. `max_depth` bounds conditional nesting and
    /// expression depth.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormula` describing the first
    /// problem found.
    pub fn validate(&self, max_depth: usize) -> DomainResult<()> {
        self.validate_at(max_depth, 1)
    }

    fn validate_at(&self, max_depth: usize, depth: usize) -> DomainResult<()> {
        if depth > max_depth {
            return Err(DomainError::InvalidFormula(format!(
                "formula nesting exceeds depth limit of {max_depth}"
            )));
        }

        match self {
            Self::Fixed { amount } => {
                if amount.is_sign_negative() {
                    return Err(DomainError::InvalidFormula(
                        "fixed amount cannot be negative".to_string(),
                    ));
                }
                Ok(())
            }
            Self::Percentage { base_input, .. } => {
                if base_input.trim().is_empty() {
                    return Err(DomainError::InvalidFormula(
                        "percentage formula needs a base input".to_string(),
                    ));
                }
                Ok(())
            }
            Self::SimpleMultiplication { rate, factors } => {
                if rate.is_sign_negative() {
                    return Err(DomainError::InvalidFormula(
                        "multiplication rate cannot be negative".to_string(),
                    ));
                }
                if factors.is_empty() {
                    return Err(DomainError::InvalidFormula(
                        "multiplication needs at least one factor".to_string(),
                    ));
                }
                if factors.iter().any(|f| f.trim().is_empty()) {
                    return Err(DomainError::InvalidFormula(
                        "multiplication factor names cannot be empty".to_string(),
                    ));
                }
                Ok(())
            }
            Self::BasePlusVariable { base, variable, .. } => {
                if base.is_sign_negative() {
                    return Err(DomainError::InvalidFormula(
                        "base amount cannot be negative".to_string(),
                    ));
                }
                if variable.trim().is_empty() {
                    return Err(DomainError::InvalidFormula(
                        "base-plus-variable formula needs a variable input".to_string(),
                    ));
                }
                Ok(())
            }
            Self::Conditional { branches, default } => {
                if branches.is_empty() && default.is_none() {
                    return Err(DomainError::InvalidFormula(
                        "conditional formula needs at least one branch or a default".to_string(),
                    ));
                }
                for branch in branches {
                    branch.then.validate_at(max_depth, depth + 1)?;
                }
                if let Some(fallback) = default {
                    fallback.validate_at(max_depth, depth + 1)?;
                }
                Ok(())
            }
            Self::TieredPricing { input, bands } => {
                if input.trim().is_empty() {
                    return Err(DomainError::InvalidFormula(
                        "tiered formula needs a driving input".to_string(),
                    ));
                }
                if bands.is_empty() {
                    return Err(DomainError::InvalidFormula(
                        "tiered formula needs at least one band".to_string(),
                    ));
                }
                let mut previous: Option<Decimal> = None;
                for (index, band) in bands.iter().enumerate() {
                    if band.rate.is_sign_negative() {
                        return Err(DomainError::InvalidFormula(
                            "tier rates cannot be negative".to_string(),
                        ));
                    }
                    let is_last = index + 1 == bands.len();
                    match band.upto {
                        None if !is_last => {
                            return Err(DomainError::InvalidFormula(
                                "only the last tier may be open-ended".to_string(),
                            ));
                        }
                        None => {}
                        Some(bound) => {
                            if is_last {
                                return Err(DomainError::InvalidFormula(
                                    "the last tier must be open-ended".to_string(),
                                ));
                            }
                            if bound <= Decimal::ZERO {
                                return Err(DomainError::InvalidFormula(
                                    "tier bounds must be positive".to_string(),
                                ));
                            }
                            if let Some(prev) = previous
                                && bound <= prev
                            {
                                return Err(DomainError::InvalidFormula(
                                    "tier bounds must be strictly ascending".to_string(),
                                ));
                            }
                            previous = Some(bound);
                        }
                    }
                }
                Ok(())
            }
            Self::ComplexFormula(expr) => {
                if expr.depth() > max_depth {
                    return Err(DomainError::InvalidFormula(format!(
                        "expression nesting exceeds depth limit of {max_depth}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Renders the formula for audit notes (e.g. `400 + grt * 0.15`).
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Fixed { amount } => format!("{amount}"),
            Self::Percentage {
                base_input,
                percent,
            } => format!("{base_input} * {percent}%"),
            Self::SimpleMultiplication { rate, factors } => {
                let mut parts = vec![rate.to_string()];
                parts.extend(factors.iter().cloned());
                parts.join(" * ")
            }
            Self::BasePlusVariable {
                base,
                rate,
                variable,
            } => format!("{base} + {variable} * {rate}"),
            Self::Conditional { branches, default } => {
                let mut parts: Vec<String> = branches
                    .iter()
                    .map(|b| format!("if {} then {}", b.when, b.then.describe()))
                    .collect();
                if let Some(fallback) = default {
                    parts.push(format!("else {}", fallback.describe()));
                }
                parts.join("; ")
            }
            Self::TieredPricing { input, bands } => {
                let bands: Vec<String> = bands
                    .iter()
                    .map(|b| match b.upto {
                        Some(bound) => format!("<= {bound} @ {}", b.rate),
                        None => format!("above @ {}", b.rate),
                    })
                    .collect();
                format!("{input} tiered [{}]", bands.join(", "))
            }
            Self::ComplexFormula(expr) => expr.to_string(),
        }
    }
}
