//! # Fee Rule Selector
//!
//! Filters and orders the fee rules applicable to one request.
//!
//! Given a snapshot of rules, the selector keeps only active rules of
//! the requested service category whose port constraint and condition
//! predicate hold for the request, ordered by `display_order` with rule
//! code as the deterministic tie-break. A rule whose condition
//! evaluates false is excluded entirely, not scored as zero.

use crate::domain::entities::fee_rule::FeeRule;
use crate::domain::value_objects::{PortCode, ServiceCategory, ServiceInputs};

/// Selects the ordered subset of rules applicable to a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeRuleSelector;

impl FeeRuleSelector {
    /// Filters and orders `rules` for one request.
    ///
    /// Rules are kept when they are active, belong to
    /// `service_category`, apply at `port` (no constraint, or an exact
    /// match), and their conditions hold for `inputs`. The result is
    /// sorted by `display_order` ascending with code order breaking
    /// ties.
    #[must_use]
    pub fn select<'a>(
        rules: &'a [FeeRule],
        service_category: ServiceCategory,
        port: Option<&PortCode>,
        inputs: &ServiceInputs,
    ) -> Vec<&'a FeeRule> {
        let mut selected: Vec<&FeeRule> = rules
            .iter()
            .filter(|r| r.is_active())
            .filter(|r| r.service_category() == service_category)
            .filter(|r| r.applies_to_port(port))
            .filter(|r| r.matches_conditions(inputs))
            .collect();

        selected.sort_by(|a, b| {
            a.display_order()
                .cmp(&b.display_order())
                .then_with(|| a.code().cmp(b.code()))
        });

        selected
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::formula::{Condition, ConditionSet, Formula};
    use crate::domain::value_objects::{ChargeClass, RuleStatus};
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn rule(code: &str, order: i32) -> FeeRule {
        FeeRule::builder(
            code,
            code,
            ServiceCategory::ShippingAgency,
            ChargeClass::BasePrice,
            Formula::Fixed { amount: dec("100") },
        )
        .display_order(order)
        .try_build(16)
        .unwrap()
    }

    #[test]
    fn orders_by_display_order_then_code() {
        let rules = vec![rule("ZULU", 1), rule("ALPHA", 2), rule("BRAVO", 1)];
        let selected = FeeRuleSelector::select(
            &rules,
            ServiceCategory::ShippingAgency,
            None,
            &ServiceInputs::new(),
        );
        let codes: Vec<&str> = selected.iter().map(|r| r.code().as_str()).collect();
        assert_eq!(codes, vec!["BRAVO", "ZULU", "ALPHA"]);
    }

    #[test]
    fn filters_inactive_rules() {
        let mut inactive = rule("INACTIVE", 1);
        inactive.set_status(RuleStatus::Inactive);
        let mut archived = rule("ARCHIVED", 2);
        archived.set_status(RuleStatus::Archived);
        let rules = vec![inactive, rule("ACTIVE", 3), archived];
        let selected = FeeRuleSelector::select(
            &rules,
            ServiceCategory::ShippingAgency,
            None,
            &ServiceInputs::new(),
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.first().unwrap().code().as_str(), "ACTIVE");
    }

    #[test]
    fn filters_other_service_categories() {
        let rules = vec![rule("AGENCY", 1)];
        let selected = FeeRuleSelector::select(
            &rules,
            ServiceCategory::Chartering,
            None,
            &ServiceInputs::new(),
        );
        assert!(selected.is_empty());
    }

    #[test]
    fn port_scoped_rule_needs_matching_port() {
        let scoped = FeeRule::builder(
            "Port dues",
            "PORT_DUES",
            ServiceCategory::ShippingAgency,
            ChargeClass::BasePrice,
            Formula::Fixed { amount: dec("500") },
        )
        .applicable_port(PortCode::new("HAIPHONG"))
        .try_build(16)
        .unwrap();
        let rules = vec![scoped, rule("GLOBAL", 2)];

        let at_haiphong = FeeRuleSelector::select(
            &rules,
            ServiceCategory::ShippingAgency,
            Some(&PortCode::new("HAIPHONG")),
            &ServiceInputs::new(),
        );
        assert_eq!(at_haiphong.len(), 2);

        let elsewhere = FeeRuleSelector::select(
            &rules,
            ServiceCategory::ShippingAgency,
            Some(&PortCode::new("HOCHIMINH")),
            &ServiceInputs::new(),
        );
        assert_eq!(elsewhere.len(), 1);
        assert_eq!(elsewhere.first().unwrap().code().as_str(), "GLOBAL");
    }

    #[test]
    fn failing_condition_excludes_rule_entirely() {
        let conditional = FeeRule::builder(
            "Deep draft surcharge",
            "DEEP_DRAFT",
            ServiceCategory::ShippingAgency,
            ChargeClass::Surcharge,
            Formula::Fixed { amount: dec("250") },
        )
        .conditions(ConditionSet::new(vec![
            Condition::at_least("dwt", dec("50000")).unwrap(),
        ]))
        .try_build(16)
        .unwrap();
        let rules = vec![conditional];

        let small_vessel = ServiceInputs::new().with("dwt", dec("20000"));
        assert!(
            FeeRuleSelector::select(
                &rules,
                ServiceCategory::ShippingAgency,
                None,
                &small_vessel
            )
            .is_empty()
        );

        let large_vessel = ServiceInputs::new().with("dwt", dec("80000"));
        assert_eq!(
            FeeRuleSelector::select(
                &rules,
                ServiceCategory::ShippingAgency,
                None,
                &large_vessel
            )
            .len(),
            1
        );
    }

    #[test]
    fn selection_is_stable_across_input_order() {
        let rules_a = vec![rule("A", 1), rule("B", 1), rule("C", 1)];
        let rules_b = vec![rule("C", 1), rule("A", 1), rule("B", 1)];
        let codes = |rules: &[FeeRule]| -> Vec<String> {
            FeeRuleSelector::select(
                rules,
                ServiceCategory::ShippingAgency,
                None,
                &ServiceInputs::new(),
            )
            .iter()
            .map(|r| r.code().to_string())
            .collect()
        };
        assert_eq!(codes(&rules_a), codes(&rules_b));
    }
}
