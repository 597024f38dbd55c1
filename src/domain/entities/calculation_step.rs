//! # Calculation Step
//!
//! One audited application of a fee rule within a quotation.
//!
//! Steps are immutable once created: re-running the orchestration
//! produces a fresh ordered set rather than mutating existing steps. A
//! step either applied (carrying the amount and the rate/multiplier
//! actually used) or was skipped with a recorded reason — skipped steps
//! keep their position in the trail so the audit record stays complete.

use crate::domain::value_objects::{
    ChargeClass, Currency, FeeRuleId, Money, Rate, RuleCode, Timestamp,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The result of applying one fee rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepOutcome {
    /// The rule evaluated successfully.
    Applied {
        /// The step's monetary result.
        amount: Money,
        /// Running subtotal before this step.
        subtotal_before: Money,
        /// Running subtotal after this step.
        subtotal_after: Money,
        /// The rate actually used, when one was resolved.
        #[serde(skip_serializing_if = "Option::is_none")]
        rate_applied: Option<Rate>,
        /// The multiplier actually used, when one applies.
        #[serde(skip_serializing_if = "Option::is_none")]
        multiplier: Option<Decimal>,
        /// Intermediate values produced during evaluation.
        trace: BTreeMap<String, Decimal>,
    },
    /// The rule failed locally and was skipped.
    Skipped {
        /// Why the rule could not be applied.
        reason: String,
    },
}

impl StepOutcome {
    /// Returns the applied amount, or `None` for skipped steps.
    #[must_use]
    pub fn amount(&self) -> Option<Money> {
        match self {
            Self::Applied { amount, .. } => Some(*amount),
            Self::Skipped { .. } => None,
        }
    }

    /// Returns true if the rule applied.
    #[inline]
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// One audited application of a fee rule.
///
/// Owned exclusively by the quotation that created it; never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStep {
    rule_id: FeeRuleId,
    rule_code: RuleCode,
    component_name: String,
    charge_class: ChargeClass,
    formula_used: String,
    inputs_used: BTreeMap<String, Decimal>,
    outcome: StepOutcome,
    step_order: u32,
    currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    calculated_at: Timestamp,
}

impl CalculationStep {
    /// Records a successfully applied rule.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn applied(
        rule_id: FeeRuleId,
        rule_code: RuleCode,
        component_name: impl Into<String>,
        charge_class: ChargeClass,
        formula_used: impl Into<String>,
        inputs_used: BTreeMap<String, Decimal>,
        amount: Money,
        subtotal_before: Money,
        subtotal_after: Money,
        rate_applied: Option<Rate>,
        multiplier: Option<Decimal>,
        trace: BTreeMap<String, Decimal>,
        step_order: u32,
        currency: Currency,
    ) -> Self {
        Self {
            rule_id,
            rule_code,
            component_name: component_name.into(),
            charge_class,
            formula_used: formula_used.into(),
            inputs_used,
            outcome: StepOutcome::Applied {
                amount,
                subtotal_before,
                subtotal_after,
                rate_applied,
                multiplier,
                trace,
            },
            step_order,
            currency,
            notes: None,
            calculated_at: Timestamp::now(),
        }
    }

    /// Records a rule that failed locally.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn skipped(
        rule_id: FeeRuleId,
        rule_code: RuleCode,
        component_name: impl Into<String>,
        charge_class: ChargeClass,
        formula_used: impl Into<String>,
        inputs_used: BTreeMap<String, Decimal>,
        reason: impl Into<String>,
        step_order: u32,
        currency: Currency,
    ) -> Self {
        Self {
            rule_id,
            rule_code,
            component_name: component_name.into(),
            charge_class,
            formula_used: formula_used.into(),
            inputs_used,
            outcome: StepOutcome::Skipped {
                reason: reason.into(),
            },
            step_order,
            currency,
            notes: None,
            calculated_at: Timestamp::now(),
        }
    }

    /// Attaches free-text calculation notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns the applied rule's ID.
    #[inline]
    #[must_use]
    pub fn rule_id(&self) -> FeeRuleId {
        self.rule_id
    }

    /// Returns the applied rule's code.
    #[inline]
    #[must_use]
    pub fn rule_code(&self) -> &RuleCode {
        &self.rule_code
    }

    /// Returns the fee component name.
    #[inline]
    #[must_use]
    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    /// Returns the charge classification.
    #[inline]
    #[must_use]
    pub fn charge_class(&self) -> ChargeClass {
        self.charge_class
    }

    /// Returns the formula text actually used.
    #[inline]
    #[must_use]
    pub fn formula_used(&self) -> &str {
        &self.formula_used
    }

    /// Returns the raw input values consulted.
    #[inline]
    #[must_use]
    pub fn inputs_used(&self) -> &BTreeMap<String, Decimal> {
        &self.inputs_used
    }

    /// Returns the step outcome.
    #[inline]
    #[must_use]
    pub fn outcome(&self) -> &StepOutcome {
        &self.outcome
    }

    /// Returns the step's position in the trail.
    #[inline]
    #[must_use]
    pub fn step_order(&self) -> u32 {
        self.step_order
    }

    /// Returns the currency the amount is expressed in.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Returns the calculation notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns when the step was calculated.
    #[inline]
    #[must_use]
    pub fn calculated_at(&self) -> Timestamp {
        self.calculated_at
    }

    /// Returns the applied amount, or `None` for skipped steps.
    #[must_use]
    pub fn amount(&self) -> Option<Money> {
        self.outcome.amount()
    }

    /// Returns true if the rule applied.
    #[inline]
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        self.outcome.is_applied()
    }
}

impl fmt::Display for CalculationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StepOutcome::Applied { amount, .. } => {
                write!(
                    f,
                    "#{} {} = {} {}",
                    self.step_order, self.rule_code, amount, self.currency
                )
            }
            StepOutcome::Skipped { reason } => {
                write!(f, "#{} {} skipped: {}", self.step_order, self.rule_code, reason)
            }
        }
    }
}
