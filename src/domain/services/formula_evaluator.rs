//! # Formula Evaluator
//!
//! Computes one monetary amount from a fee formula and a bag of named
//! inputs, together with the intermediate values used.
//!
//! All monetary results are rounded to 2 decimal places half-up; all
//! intermediate rate/coefficient values are rounded to 6 decimal places
//! before being folded into further arithmetic, so results are
//! reproducible regardless of evaluation order. Recursion through
//! conditional sub-formulas is bounded by a configurable depth limit.
//!
//! A failed evaluation (missing input, division by zero, unknown
//! identifier) fails only the rule being evaluated — the caller records
//! the failure as a skipped step and continues.
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::services::formula_evaluator::FormulaEvaluator;
//! use seaquote::domain::formula::Formula;
//! use seaquote::domain::value_objects::ServiceInputs;
//! use rust_decimal::Decimal;
//!
//! let evaluator = FormulaEvaluator::default();
//! let formula = Formula::BasePlusVariable {
//!     base: Decimal::new(400, 0),
//!     rate: Decimal::new(15, 2),
//!     variable: "grt".to_string(),
//! };
//! let inputs = ServiceInputs::new().with("grt", Decimal::new(20_000, 0));
//!
//! let result = evaluator.evaluate(&formula, &inputs).unwrap();
//! assert_eq!(result.amount.to_string(), "3400.00");
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::formula::Formula;
use crate::domain::value_objects::arithmetic::{CheckedArithmetic, round_money, round_rate};
use crate::domain::value_objects::{Money, ServiceInputs};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Default bound on conditional/expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// The result of evaluating one formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The monetary amount, rounded to the currency scale.
    pub amount: Money,
    /// Intermediate values used, rounded to the rate scale.
    pub trace: BTreeMap<String, Decimal>,
}

/// Evaluates fee formulas against request inputs.
#[derive(Debug, Clone, Copy)]
pub struct FormulaEvaluator {
    max_depth: usize,
}

impl FormulaEvaluator {
    /// Creates an evaluator with an explicit depth bound.
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Returns the configured depth bound.
    #[inline]
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Evaluates a formula against the given inputs.
    ///
    /// # Errors
    ///
    /// Returns a pricing-category [`DomainError`] when evaluation
    /// fails: `MissingInput`, `UnknownIdentifier`, `DivisionByZero`,
    /// `EvaluationDepthExceeded`, or `FormulaEvaluation` for a negative
    /// result.
    pub fn evaluate(&self, formula: &Formula, inputs: &ServiceInputs) -> DomainResult<Evaluation> {
        let mut trace = BTreeMap::new();
        let value = self.eval_inner(formula, inputs, &mut trace, 1)?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::FormulaEvaluation(format!(
                "result is negative: {value}"
            )));
        }
        let amount = Money::new(round_money(value))?;
        Ok(Evaluation { amount, trace })
    }

    fn eval_inner(
        &self,
        formula: &Formula,
        inputs: &ServiceInputs,
        trace: &mut BTreeMap<String, Decimal>,
        depth: usize,
    ) -> DomainResult<Decimal> {
        if depth > self.max_depth {
            return Err(DomainError::EvaluationDepthExceeded(self.max_depth));
        }

        match formula {
            Formula::Fixed { amount } => Ok(*amount),

            Formula::Percentage {
                base_input,
                percent,
            } => {
                let base = require(inputs, base_input)?;
                let base = round_rate(base);
                let percent = round_rate(*percent);
                trace.insert(base_input.to_ascii_lowercase(), base);
                trace.insert("percent".to_string(), percent);
                let product = round_rate(base.safe_mul(percent)?);
                Ok(round_rate(product.safe_div(Decimal::ONE_HUNDRED)?))
            }

            Formula::SimpleMultiplication { rate, factors } => {
                let mut acc = round_rate(*rate);
                trace.insert("rate".to_string(), acc);
                for factor in factors {
                    let value = round_rate(require(inputs, factor)?);
                    trace.insert(factor.to_ascii_lowercase(), value);
                    acc = round_rate(acc.safe_mul(value)?);
                }
                Ok(acc)
            }

            Formula::BasePlusVariable {
                base,
                rate,
                variable,
            } => {
                let value = round_rate(require(inputs, variable)?);
                let rate = round_rate(*rate);
                trace.insert(variable.to_ascii_lowercase(), value);
                trace.insert("rate".to_string(), rate);
                trace.insert("base".to_string(), *base);
                let variable_part = round_rate(value.safe_mul(rate)?);
                Ok(base.safe_add(variable_part)?)
            }

            Formula::Conditional { branches, default } => {
                for branch in branches {
                    if branch.when.matches(inputs) {
                        return self.eval_inner(&branch.then, inputs, trace, depth + 1);
                    }
                }
                match default {
                    Some(fallback) => self.eval_inner(fallback, inputs, trace, depth + 1),
                    None => Ok(Decimal::ZERO),
                }
            }

            Formula::TieredPricing { input, bands } => {
                let quantity = require(inputs, input)?;
                trace.insert(input.to_ascii_lowercase(), round_rate(quantity));
                let mut total = Decimal::ZERO;
                let mut lower = Decimal::ZERO;
                for (index, band) in bands.iter().enumerate() {
                    let upper = band.upto.unwrap_or(quantity);
                    let portion = quantity.min(upper).safe_sub(lower).unwrap_or(Decimal::ZERO);
                    if portion <= Decimal::ZERO {
                        break;
                    }
                    let contribution = round_rate(portion.safe_mul(round_rate(band.rate))?);
                    trace.insert(format!("tier_{}", index + 1), contribution);
                    total = total.safe_add(contribution)?;
                    lower = upper;
                    if quantity <= upper {
                        break;
                    }
                }
                Ok(total)
            }

            Formula::ComplexFormula(expr) => {
                for name in expr.identifiers() {
                    if let Some(value) = inputs.get(&name) {
                        trace.insert(name, round_rate(value));
                    }
                }
                expr.evaluate(inputs)
            }
        }
    }
}

impl Default for FormulaEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

fn require(inputs: &ServiceInputs, name: &str) -> DomainResult<Decimal> {
    inputs
        .get(name)
        .ok_or_else(|| DomainError::MissingInput(name.to_ascii_lowercase()))
}
