//! # Fee Rule Entity
//!
//! An administrator-authored pricing rule.
//!
//! This module provides the [`FeeRule`] entity: a named, coded formula
//! owned by a service category, optionally constrained to a port and to
//! an input-value window, ordered for evaluation and reporting by
//! `display_order`.
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::entities::fee_rule::FeeRuleBuilder;
//! use seaquote::domain::formula::Formula;
//! use seaquote::domain::value_objects::{ChargeClass, ServiceCategory};
//! use rust_decimal::Decimal;
//!
//! let rule = FeeRuleBuilder::new(
//!     "Agency Fee",
//!     "AGENCY_FEE",
//!     ServiceCategory::ShippingAgency,
//!     ChargeClass::BasePrice,
//!     Formula::BasePlusVariable {
//!         base: Decimal::new(400, 0),
//!         rate: Decimal::new(15, 2),
//!         variable: "grt".to_string(),
//!     },
//! )
//! .display_order(2)
//! .try_build(16)
//! .unwrap();
//!
//! assert!(rule.is_active());
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::formula::{ConditionSet, Formula};
use crate::domain::value_objects::{
    ChargeClass, FeeRuleId, PortCode, RuleCode, RuleStatus, ServiceCategory, ServiceInputs,
    Timestamp,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An administrator-defined pricing rule.
///
/// # Invariants
///
/// - `code` is unique across all rules (enforced by the repository)
/// - The formula has been validated before the rule can be active
/// - `display_order` defines evaluation/reporting order within a
///   service category; ties break on `code`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRule {
    id: FeeRuleId,
    name: String,
    code: RuleCode,
    service_category: ServiceCategory,
    charge_class: ChargeClass,
    formula: Formula,
    #[serde(skip_serializing_if = "Option::is_none")]
    formula_description: Option<String>,
    /// Rate-table category resolved for this rule and injected into the
    /// evaluation inputs under the name `rate`.
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    applicable_port: Option<PortCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conditions: Option<ConditionSet>,
    display_order: i32,
    status: RuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<Timestamp>,
}

impl FeeRule {
    /// Returns a builder for constructing a rule.
    #[must_use]
    pub fn builder(
        name: impl Into<String>,
        code: impl Into<RuleCode>,
        service_category: ServiceCategory,
        charge_class: ChargeClass,
        formula: Formula,
    ) -> FeeRuleBuilder {
        FeeRuleBuilder::new(name, code, service_category, charge_class, formula)
    }

    /// Returns the rule ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> FeeRuleId {
        self.id
    }

    /// Returns the human-facing fee name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unique rule code.
    #[inline]
    #[must_use]
    pub fn code(&self) -> &RuleCode {
        &self.code
    }

    /// Returns the owning service category.
    #[inline]
    #[must_use]
    pub fn service_category(&self) -> ServiceCategory {
        self.service_category
    }

    /// Returns how amounts from this rule are classified.
    #[inline]
    #[must_use]
    pub fn charge_class(&self) -> ChargeClass {
        self.charge_class
    }

    /// Returns the formula.
    #[inline]
    #[must_use]
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Returns the admin-facing formula description, if any.
    #[must_use]
    pub fn formula_description(&self) -> Option<&str> {
        self.formula_description.as_deref()
    }

    /// Returns the rate-table category this rule draws on, if any.
    #[must_use]
    pub fn rate_source(&self) -> Option<&str> {
        self.rate_source.as_deref()
    }

    /// Returns the port constraint, if any.
    #[must_use]
    pub fn applicable_port(&self) -> Option<&PortCode> {
        self.applicable_port.as_ref()
    }

    /// Returns the applicability conditions, if any.
    #[must_use]
    pub fn conditions(&self) -> Option<&ConditionSet> {
        self.conditions.as_ref()
    }

    /// Returns the display order.
    #[inline]
    #[must_use]
    pub fn display_order(&self) -> i32 {
        self.display_order
    }

    /// Returns the lifecycle status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> RuleStatus {
        self.status
    }

    /// Returns the admin notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns when the rule was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns when the rule was last updated.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Option<Timestamp> {
        self.updated_at
    }

    /// Returns true if the rule participates in pricing.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns true if the rule applies at the given port.
    ///
    /// A rule without a port constraint applies everywhere; a
    /// constrained rule requires an exactly matching request port.
    #[must_use]
    pub fn applies_to_port(&self, port: Option<&PortCode>) -> bool {
        match (&self.applicable_port, port) {
            (None, _) => true,
            (Some(required), Some(given)) => required == given,
            (Some(_), None) => false,
        }
    }

    /// Returns true if the rule's conditions hold for the given inputs.
    ///
    /// A rule without conditions always matches.
    #[must_use]
    pub fn matches_conditions(&self, inputs: &ServiceInputs) -> bool {
        self.conditions
            .as_ref()
            .is_none_or(|set| set.matches(inputs))
    }

    /// Changes the lifecycle status, stamping `updated_at`.
    pub fn set_status(&mut self, status: RuleStatus) {
        self.status = status;
        self.updated_at = Some(Timestamp::now());
    }

    /// Replaces the formula after re-validation, stamping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormula` if the new formula fails
    /// validation.
    pub fn replace_formula(&mut self, formula: Formula, max_depth: usize) -> DomainResult<()> {
        formula.validate(max_depth)?;
        self.formula = formula;
        self.updated_at = Some(Timestamp::now());
        Ok(())
    }
}

impl fmt::Display for FeeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FeeRule({} [{}] for {})",
            self.code, self.charge_class, self.service_category
        )
    }
}

/// Builder for constructing [`FeeRule`] instances.
///
/// # Examples
///
/// ```
/// use seaquote::domain::entities::fee_rule::FeeRuleBuilder;
/// use seaquote::domain::formula::Formula;
/// use seaquote::domain::value_objects::{ChargeClass, PortCode, ServiceCategory};
/// use rust_decimal::Decimal;
///
/// let rule = FeeRuleBuilder::new(
///     "Pilotage",
///     "PILOTAGE",
///     ServiceCategory::ShippingAgency,
///     ChargeClass::BasePrice,
///     Formula::Fixed { amount: Decimal::new(300, 0) },
/// )
/// .applicable_port(PortCode::new("HAIPHONG"))
/// .rate_source("PILOTAGE")
/// .try_build(16)
/// .unwrap();
///
/// assert_eq!(rule.applicable_port().unwrap().as_str(), "HAIPHONG");
/// ```
#[derive(Debug, Clone)]
pub struct FeeRuleBuilder {
    name: String,
    code: RuleCode,
    service_category: ServiceCategory,
    charge_class: ChargeClass,
    formula: Formula,
    formula_description: Option<String>,
    rate_source: Option<String>,
    applicable_port: Option<PortCode>,
    conditions: Option<ConditionSet>,
    display_order: i32,
    status: RuleStatus,
    notes: Option<String>,
}

impl FeeRuleBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        code: impl Into<RuleCode>,
        service_category: ServiceCategory,
        charge_class: ChargeClass,
        formula: Formula,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            service_category,
            charge_class,
            formula,
            formula_description: None,
            rate_source: None,
            applicable_port: None,
            conditions: None,
            display_order: 0,
            status: RuleStatus::Active,
            notes: None,
        }
    }

    /// Sets the admin-facing formula description.
    #[must_use]
    pub fn formula_description(mut self, description: impl Into<String>) -> Self {
        self.formula_description = Some(description.into());
        self
    }

    /// Names the rate-table category this rule draws on.
    #[must_use]
    pub fn rate_source(mut self, category: impl Into<String>) -> Self {
        self.rate_source = Some(category.into().trim().to_ascii_uppercase());
        self
    }

    /// Constrains the rule to one port.
    #[must_use]
    pub fn applicable_port(mut self, port: PortCode) -> Self {
        self.applicable_port = Some(port);
        self
    }

    /// Sets the applicability conditions.
    #[must_use]
    pub fn conditions(mut self, conditions: ConditionSet) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Sets the display order.
    #[must_use]
    pub fn display_order(mut self, order: i32) -> Self {
        self.display_order = order;
        self
    }

    /// Sets the lifecycle status.
    #[must_use]
    pub fn status(mut self, status: RuleStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the admin notes.
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Builds the rule, validating the formula first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if the name or code is
    /// blank and `DomainError::InvalidFormula` if the formula fails
    /// validation.
    pub fn try_build(self, max_depth: usize) -> DomainResult<FeeRule> {
        if self.name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "fee name cannot be empty".to_string(),
            ));
        }
        if self.code.as_str().is_empty() {
            return Err(DomainError::ValidationError(
                "fee code cannot be empty".to_string(),
            ));
        }
        self.formula.validate(max_depth)?;

        Ok(FeeRule {
            id: FeeRuleId::new_v4(),
            name: self.name,
            code: self.code,
            service_category: self.service_category,
            charge_class: self.charge_class,
            formula: self.formula,
            formula_description: self.formula_description,
            rate_source: self.rate_source,
            applicable_port: self.applicable_port,
            conditions: self.conditions,
            display_order: self.display_order,
            status: self.status,
            notes: self.notes,
            created_at: Timestamp::now(),
            updated_at: None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::formula::Condition;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn fixed_rule(code: &str) -> FeeRuleBuilder {
        FeeRuleBuilder::new(
            "Documentation Fee",
            code,
            ServiceCategory::FreightForwarding,
            ChargeClass::BasePrice,
            Formula::Fixed {
                amount: dec("230"),
            },
        )
    }

    mod construction {
        use super::*;

        #[test]
        fn builds_active_rule_with_defaults() {
            let rule = fixed_rule("DOC_FEE").try_build(16).unwrap();
            assert!(rule.is_active());
            assert_eq!(rule.display_order(), 0);
            assert!(rule.applicable_port().is_none());
            assert!(rule.conditions().is_none());
            assert!(rule.updated_at().is_none());
        }

        #[test]
        fn rejects_blank_name() {
            let result = FeeRuleBuilder::new(
                "  ",
                "DOC_FEE",
                ServiceCategory::FreightForwarding,
                ChargeClass::BasePrice,
                Formula::Fixed { amount: dec("1") },
            )
            .try_build(16);
            assert!(matches!(result, Err(DomainError::ValidationError(_))));
        }

        #[test]
        fn rejects_invalid_formula() {
            let result = FeeRuleBuilder::new(
                "Bad",
                "BAD",
                ServiceCategory::Chartering,
                ChargeClass::BasePrice,
                Formula::SimpleMultiplication {
                    rate: dec("1"),
                    factors: vec![],
                },
            )
            .try_build(16);
            assert!(matches!(result, Err(DomainError::InvalidFormula(_))));
        }

        #[test]
        fn rate_source_is_normalized() {
            let rule = fixed_rule("DOC_FEE")
                .rate_source(" pilotage ")
                .try_build(16)
                .unwrap();
            assert_eq!(rule.rate_source(), Some("PILOTAGE"));
        }
    }

    mod applicability {
        use super::*;

        #[test]
        fn unconstrained_rule_applies_everywhere() {
            let rule = fixed_rule("DOC_FEE").try_build(16).unwrap();
            assert!(rule.applies_to_port(None));
            assert!(rule.applies_to_port(Some(&PortCode::new("HAIPHONG"))));
        }

        #[test]
        fn port_constraint_requires_exact_match() {
            let rule = fixed_rule("DOC_FEE")
                .applicable_port(PortCode::new("HAIPHONG"))
                .try_build(16)
                .unwrap();
            assert!(rule.applies_to_port(Some(&PortCode::new("haiphong"))));
            assert!(!rule.applies_to_port(Some(&PortCode::new("HOCHIMINH"))));
            assert!(!rule.applies_to_port(None));
        }

        #[test]
        fn conditions_gate_applicability() {
            let rule = fixed_rule("DOC_FEE")
                .conditions(ConditionSet::new(vec![
                    Condition::at_least("dwt", dec("10000")).unwrap(),
                ]))
                .try_build(16)
                .unwrap();
            let small = ServiceInputs::new().with("dwt", dec("5000"));
            let large = ServiceInputs::new().with("dwt", dec("20000"));
            assert!(!rule.matches_conditions(&small));
            assert!(rule.matches_conditions(&large));
        }
    }

    mod mutation {
        use super::*;

        #[test]
        fn set_status_stamps_updated_at() {
            let mut rule = fixed_rule("DOC_FEE").try_build(16).unwrap();
            rule.set_status(RuleStatus::Inactive);
            assert!(!rule.is_active());
            assert!(rule.updated_at().is_some());
        }

        #[test]
        fn replace_formula_revalidates() {
            let mut rule = fixed_rule("DOC_FEE").try_build(16).unwrap();
            let bad = Formula::Fixed { amount: dec("-1") };
            assert!(rule.replace_formula(bad, 16).is_err());
            let good = Formula::Fixed { amount: dec("250") };
            assert!(rule.replace_formula(good, 16).is_ok());
        }
    }

    mod serde_support {
        use super::*;

        #[test]
        fn roundtrip() {
            let rule = fixed_rule("DOC_FEE")
                .applicable_port(PortCode::new("HAIPHONG"))
                .display_order(3)
                .try_build(16)
                .unwrap();
            let json = serde_json::to_string(&rule).unwrap();
            let back: FeeRule = serde_json::from_str(&json).unwrap();
            assert_eq!(rule, back);
        }
    }
}
