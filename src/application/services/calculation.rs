//! # Calculation Engine
//!
//! Drives rule selection and formula evaluation over a request's input
//! data, producing an ordered calculation trail and aggregate totals.
//!
//! The engine is a pure function of the request plus a
//! [`PricingSnapshot`] taken once at the start of orchestration:
//! re-running it against an unchanged snapshot and unchanged inputs
//! yields identical step amounts and totals. Per-rule failures (rate
//! not found, missing input, division by zero) are recorded as skipped
//! steps and never halt the remaining rules.
//!
//! # Examples
//!
//! ```
//! use seaquote::application::services::calculation::{CalculationEngine, CalculationRequest};
//! use seaquote::application::services::pricing_snapshot::PricingSnapshot;
//! use seaquote::domain::entities::fee_rule::FeeRule;
//! use seaquote::domain::formula::Formula;
//! use seaquote::domain::value_objects::{ChargeClass, ServiceCategory, ServiceInputs};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let rule = FeeRule::builder(
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
//! .try_build(16)
//! .unwrap();
//!
//! let snapshot = PricingSnapshot::new(vec![rule], Vec::new());
//! let request = CalculationRequest {
//!     service_category: ServiceCategory::ShippingAgency,
//!     port: None,
//!     destination: None,
//!     as_of: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
//!     inputs: ServiceInputs::new().with("grt", Decimal::new(20_000, 0)),
//! };
//!
//! let draft = CalculationEngine::default().calculate(&request, &snapshot).unwrap();
//! assert_eq!(draft.totals.final_amount.to_string(), "3400.00");
//! ```

use crate::application::services::pricing_snapshot::PricingSnapshot;
use crate::domain::entities::calculation_step::CalculationStep;
use crate::domain::entities::fee_rule::FeeRule;
use crate::domain::entities::quotation::QuotationTotals;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::formula::{Formula, FormulaKind};
use crate::domain::services::formula_evaluator::{Evaluation, FormulaEvaluator};
use crate::domain::services::rate_resolver::{RateQuery, RateResolver};
use crate::domain::services::rule_selector::FeeRuleSelector;
use crate::domain::value_objects::arithmetic::round_rate;
use crate::domain::value_objects::{
    ChargeClass, Currency, Money, PortCode, Rate, ServiceCategory, ServiceInputs,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// The name under which a resolved market rate is injected into the
/// evaluation inputs.
pub const RESOLVED_RATE_INPUT: &str = "rate";

/// One pricing request.
#[derive(Debug, Clone)]
pub struct CalculationRequest {
    /// The service line being priced.
    pub service_category: ServiceCategory,
    /// Port of call / route origin, when the request has one.
    pub port: Option<PortCode>,
    /// Route destination, for route-scoped rate lookups.
    pub destination: Option<PortCode>,
    /// The point in time rates must be valid at.
    pub as_of: NaiveDate,
    /// The customer's service-specific input data.
    pub inputs: ServiceInputs,
}

/// The result of one orchestration run, not yet an aggregate.
#[derive(Debug, Clone)]
pub struct QuotationDraft {
    /// The priced service line.
    pub service_category: ServiceCategory,
    /// Port of call, when the request had one.
    pub port: Option<PortCode>,
    /// The as-of date the calculation used.
    pub as_of: NaiveDate,
    /// The input snapshot the calculation used.
    pub inputs: ServiceInputs,
    /// The ordered calculation trail, skipped steps included.
    pub steps: Vec<CalculationStep>,
    /// Aggregate totals.
    pub totals: QuotationTotals,
}

impl QuotationDraft {
    /// Returns the number of steps that applied successfully.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_applied()).count()
    }

    /// Returns the number of steps skipped with an error note.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.steps.len() - self.applied_count()
    }
}

/// Orchestrates rule selection, rate resolution and formula evaluation.
#[derive(Debug, Clone)]
pub struct CalculationEngine {
    evaluator: FormulaEvaluator,
    tax_rate: Decimal,
    currency: Currency,
}

impl CalculationEngine {
    /// Creates an engine with an explicit tax policy and currency.
    #[must_use]
    pub fn new(evaluator: FormulaEvaluator, tax_rate: Decimal, currency: Currency) -> Self {
        Self {
            evaluator,
            tax_rate: round_rate(tax_rate),
            currency,
        }
    }

    /// Returns the fixed tax rate applied on subtotals.
    #[inline]
    #[must_use]
    pub const fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Runs one pricing orchestration against a consistent snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoApplicableRules` when the selector
    /// produces an empty set, and propagates arithmetic failures on the
    /// aggregate totals. Per-rule evaluation failures do not error —
    /// they become skipped steps.
    pub fn calculate(
        &self,
        request: &CalculationRequest,
        snapshot: &PricingSnapshot,
    ) -> DomainResult<QuotationDraft> {
        let rules = FeeRuleSelector::select(
            snapshot.fee_rules(),
            request.service_category,
            request.port.as_ref(),
            &request.inputs,
        );

        if rules.is_empty() {
            let port = request
                .port
                .as_ref()
                .map_or_else(|| "any port".to_string(), ToString::to_string);
            return Err(DomainError::NoApplicableRules(format!(
                "{} at {}",
                request.service_category, port
            )));
        }

        debug!(
            category = %request.service_category,
            rules = rules.len(),
            "selected fee rules"
        );

        let mut steps: Vec<CalculationStep> = Vec::with_capacity(rules.len());
        let mut base_price = Money::ZERO;
        let mut total_surcharges = Money::ZERO;
        let mut total_discounts = Money::ZERO;

        for (index, rule) in rules.iter().enumerate() {
            let step_order = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
            let (effective_inputs, resolved_rate) =
                match self.gather_inputs(rule, request, snapshot) {
                    Ok(pair) => pair,
                    Err(err) if err.is_step_local() => {
                        warn!(rule = %rule.code(), error = %err, "rule skipped");
                        steps.push(self.skipped_step(rule, request, step_order, &err));
                        continue;
                    }
                    Err(err) => return Err(err),
                };

            match self.evaluator.evaluate(rule.formula(), &effective_inputs) {
                Ok(evaluation) => {
                    let before = net_subtotal(base_price, total_surcharges, total_discounts)?;
                    match rule.charge_class() {
                        ChargeClass::BasePrice => {
                            base_price = base_price.safe_add(evaluation.amount)?;
                        }
                        ChargeClass::Surcharge => {
                            total_surcharges = total_surcharges.safe_add(evaluation.amount)?;
                        }
                        ChargeClass::Discount => {
                            total_discounts = total_discounts.safe_add(evaluation.amount)?;
                        }
                    }
                    let after = net_subtotal(base_price, total_surcharges, total_discounts)?;
                    steps.push(self.applied_step(
                        rule,
                        &effective_inputs,
                        evaluation,
                        before,
                        after,
                        resolved_rate,
                        step_order,
                    ));
                }
                Err(err) if err.is_step_local() => {
                    warn!(rule = %rule.code(), error = %err, "rule skipped");
                    steps.push(self.skipped_step(rule, request, step_order, &err));
                }
                Err(err) => return Err(err),
            }
        }

        let subtotal = net_subtotal(base_price, total_surcharges, total_discounts)?;
        let tax_amount = subtotal.safe_mul(self.tax_rate)?;
        let final_amount = subtotal.safe_add(tax_amount)?;

        info!(
            category = %request.service_category,
            applied = steps.iter().filter(|s| s.is_applied()).count(),
            skipped = steps.iter().filter(|s| !s.is_applied()).count(),
            %final_amount,
            "calculation completed"
        );

        Ok(QuotationDraft {
            service_category: request.service_category,
            port: request.port.clone(),
            as_of: request.as_of,
            inputs: request.inputs.clone(),
            steps,
            totals: QuotationTotals {
                base_price,
                total_surcharges,
                total_discounts,
                subtotal,
                tax_amount,
                final_amount,
                currency: self.currency.clone(),
            },
        })
    }

    /// Builds the effective input bag for one rule, resolving its
    /// market rate when it names one.
    fn gather_inputs(
        &self,
        rule: &FeeRule,
        request: &CalculationRequest,
        snapshot: &PricingSnapshot,
    ) -> DomainResult<(ServiceInputs, Option<Rate>)> {
        let Some(rate_category) = rule.rate_source() else {
            return Ok((request.inputs.clone(), None));
        };

        let Some(port) = request.port.as_ref() else {
            return Err(DomainError::RateNotFound(format!(
                "{rate_category}: request names no port"
            )));
        };

        let entry = RateResolver::resolve(
            snapshot.rate_entries(),
            &RateQuery {
                service_category: request.service_category,
                rate_category,
                from: port,
                to: request.destination.as_ref(),
                as_of: request.as_of,
            },
        )?;

        let mut inputs = request.inputs.clone();
        inputs.insert(RESOLVED_RATE_INPUT, entry.base_rate().get());
        Ok((inputs, Some(entry.base_rate())))
    }

    #[allow(clippy::too_many_arguments)]
    fn applied_step(
        &self,
        rule: &FeeRule,
        effective_inputs: &ServiceInputs,
        evaluation: Evaluation,
        subtotal_before: Money,
        subtotal_after: Money,
        resolved_rate: Option<Rate>,
        step_order: u32,
    ) -> CalculationStep {
        let inputs_used = consulted_inputs(effective_inputs, &evaluation.trace);
        let rate_applied = resolved_rate.or_else(|| {
            evaluation
                .trace
                .get("rate")
                .and_then(|value| Rate::new(*value).ok())
        });
        let multiplier = derive_multiplier(rule.formula(), &evaluation.trace);

        let mut step = CalculationStep::applied(
            rule.id(),
            rule.code().clone(),
            rule.name(),
            rule.charge_class(),
            rule.formula().describe(),
            inputs_used,
            evaluation.amount,
            subtotal_before,
            subtotal_after,
            rate_applied,
            multiplier,
            evaluation.trace,
            step_order,
            self.currency.clone(),
        );
        if let Some(description) = rule.formula_description() {
            step = step.with_notes(description);
        }
        step
    }

    fn skipped_step(
        &self,
        rule: &FeeRule,
        request: &CalculationRequest,
        step_order: u32,
        error: &DomainError,
    ) -> CalculationStep {
        CalculationStep::skipped(
            rule.id(),
            rule.code().clone(),
            rule.name(),
            rule.charge_class(),
            rule.formula().describe(),
            request.inputs.iter().map(|(k, v)| (k.to_string(), v)).collect(),
            error.to_string(),
            step_order,
            self.currency.clone(),
        )
    }
}

impl Default for CalculationEngine {
    fn default() -> Self {
        Self::new(FormulaEvaluator::default(), Decimal::ZERO, Currency::usd())
    }
}

/// `base + surcharges - discounts`, floored at zero.
///
/// Discounts cannot drive the subtotal negative.
fn net_subtotal(base: Money, surcharges: Money, discounts: Money) -> DomainResult<Money> {
    let gross = base.safe_add(surcharges)?;
    Ok(gross.safe_sub(discounts.min(gross))?)
}

/// Restricts the effective input bag to the values the evaluation
/// actually consulted.
fn consulted_inputs(
    inputs: &ServiceInputs,
    trace: &BTreeMap<String, Decimal>,
) -> BTreeMap<String, Decimal> {
    trace
        .keys()
        .filter_map(|name| inputs.get(name).map(|value| (name.clone(), value)))
        .collect()
}

/// Derives the audited multiplier for formula shapes that have one.
fn derive_multiplier(formula: &Formula, trace: &BTreeMap<String, Decimal>) -> Option<Decimal> {
    match formula.kind() {
        FormulaKind::SimpleMultiplication => {
            let Formula::SimpleMultiplication { factors, .. } = formula else {
                return None;
            };
            let mut product = Decimal::ONE;
            for factor in factors {
                product = round_rate(product * trace.get(&factor.to_ascii_lowercase()).copied()?);
            }
            Some(product)
        }
        FormulaKind::Percentage => trace
            .get("percent")
            .map(|percent| round_rate(*percent / Decimal::ONE_HUNDRED)),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::rate_entry::RateTableEntry;
    use crate::domain::formula::{Condition, ConditionSet, TierBand};
    use crate::domain::value_objects::RuleCode;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn agency_rule(
        code: &str,
        order: i32,
        class: ChargeClass,
        formula: Formula,
    ) -> FeeRule {
        FeeRule::builder(code, code, ServiceCategory::ShippingAgency, class, formula)
            .display_order(order)
            .try_build(16)
            .unwrap()
    }

    fn request(inputs: ServiceInputs) -> CalculationRequest {
        CalculationRequest {
            service_category: ServiceCategory::ShippingAgency,
            port: Some(PortCode::new("HAIPHONG")),
            destination: None,
            as_of: date(2024, 8, 15),
            inputs,
        }
    }

    fn snapshot_with(rules: Vec<FeeRule>, rates: Vec<RateTableEntry>) -> PricingSnapshot {
        PricingSnapshot::new(rules, rates)
    }

    mod totals {
        use super::*;

        #[test]
        fn sums_base_surcharge_and_discount_classes() {
            let rules = vec![
                agency_rule(
                    "BASE",
                    1,
                    ChargeClass::BasePrice,
                    Formula::Fixed {
                        amount: dec("1000"),
                    },
                ),
                agency_rule(
                    "FUEL_SURCHARGE",
                    2,
                    ChargeClass::Surcharge,
                    Formula::Fixed {
                        amount: dec("100"),
                    },
                ),
                agency_rule(
                    "LOYALTY_DISCOUNT",
                    3,
                    ChargeClass::Discount,
                    Formula::Fixed {
                        amount: dec("50"),
                    },
                ),
            ];
            let draft = CalculationEngine::default()
                .calculate(&request(ServiceInputs::new()), &snapshot_with(rules, vec![]))
                .unwrap();

            assert_eq!(draft.totals.base_price.to_string(), "1000.00");
            assert_eq!(draft.totals.total_surcharges.to_string(), "100.00");
            assert_eq!(draft.totals.total_discounts.to_string(), "50.00");
            assert_eq!(draft.totals.subtotal.to_string(), "1050.00");
            assert_eq!(draft.totals.tax_amount.to_string(), "0.00");
            assert_eq!(draft.totals.final_amount.to_string(), "1050.00");
        }

        #[test]
        fn tax_policy_applies_on_subtotal() {
            let rules = vec![agency_rule(
                "BASE",
                1,
                ChargeClass::BasePrice,
                Formula::Fixed {
                    amount: dec("1000"),
                },
            )];
            let engine = CalculationEngine::new(
                FormulaEvaluator::default(),
                dec("0.08"),
                Currency::usd(),
            );
            let draft = engine
                .calculate(&request(ServiceInputs::new()), &snapshot_with(rules, vec![]))
                .unwrap();
            assert_eq!(draft.totals.tax_amount.to_string(), "80.00");
            assert_eq!(draft.totals.final_amount.to_string(), "1080.00");
        }

        #[test]
        fn discounts_cannot_drive_subtotal_negative() {
            let rules = vec![
                agency_rule(
                    "BASE",
                    1,
                    ChargeClass::BasePrice,
                    Formula::Fixed { amount: dec("10") },
                ),
                agency_rule(
                    "BIG_DISCOUNT",
                    2,
                    ChargeClass::Discount,
                    Formula::Fixed {
                        amount: dec("100"),
                    },
                ),
            ];
            let draft = CalculationEngine::default()
                .calculate(&request(ServiceInputs::new()), &snapshot_with(rules, vec![]))
                .unwrap();
            assert_eq!(draft.totals.subtotal, Money::ZERO);
        }
    }

    mod failures {
        use super::*;

        #[test]
        fn empty_selection_is_no_pricing_available() {
            let result = CalculationEngine::default()
                .calculate(&request(ServiceInputs::new()), &snapshot_with(vec![], vec![]));
            assert!(matches!(result, Err(DomainError::NoApplicableRules(_))));
        }

        #[test]
        fn per_rule_failure_skips_only_that_rule() {
            let rules = vec![
                agency_rule(
                    "NEEDS_GRT",
                    1,
                    ChargeClass::BasePrice,
                    Formula::SimpleMultiplication {
                        rate: dec("0.025"),
                        factors: vec!["grt".to_string()],
                    },
                ),
                agency_rule(
                    "FLAT",
                    2,
                    ChargeClass::BasePrice,
                    Formula::Fixed {
                        amount: dec("300"),
                    },
                ),
            ];
            let draft = CalculationEngine::default()
                .calculate(&request(ServiceInputs::new()), &snapshot_with(rules, vec![]))
                .unwrap();

            assert_eq!(draft.applied_count(), 1);
            assert_eq!(draft.skipped_count(), 1);
            assert_eq!(draft.totals.final_amount.to_string(), "300.00");
            let skipped = draft.steps.first().unwrap();
            assert!(!skipped.is_applied());
            assert_eq!(skipped.rule_code(), &RuleCode::new("NEEDS_GRT"));
        }

        #[test]
        fn missing_rate_entry_skips_the_dependent_rule() {
            let rules = vec![FeeRule::builder(
                "Pilotage",
                "PILOTAGE",
                ServiceCategory::ShippingAgency,
                ChargeClass::BasePrice,
                Formula::SimpleMultiplication {
                    rate: dec("1"),
                    factors: vec!["rate".to_string()],
                },
            )
            .rate_source("PILOTAGE")
            .try_build(16)
            .unwrap()];

            let draft = CalculationEngine::default()
                .calculate(&request(ServiceInputs::new()), &snapshot_with(rules, vec![]))
                .unwrap();
            assert_eq!(draft.skipped_count(), 1);
        }
    }

    mod rate_injection {
        use super::*;
        use crate::domain::value_objects::Rate;

        fn pilotage_rate() -> RateTableEntry {
            RateTableEntry::builder(
                ServiceCategory::ShippingAgency,
                "PILOTAGE",
                "Pilotage per call",
                PortCode::new("HAIPHONG"),
                Rate::new(dec("0.03")).unwrap(),
                date(2024, 1, 1),
            )
            .try_build()
            .unwrap()
        }

        #[test]
        fn resolved_rate_is_injected_under_rate_input() {
            let rules = vec![FeeRule::builder(
                "Pilotage",
                "PILOTAGE",
                ServiceCategory::ShippingAgency,
                ChargeClass::BasePrice,
                Formula::SimpleMultiplication {
                    rate: dec("1"),
                    factors: vec!["grt".to_string(), "rate".to_string()],
                },
            )
            .rate_source("pilotage")
            .try_build(16)
            .unwrap()];

            let draft = CalculationEngine::default()
                .calculate(
                    &request(ServiceInputs::new().with("grt", dec("20000"))),
                    &snapshot_with(rules, vec![pilotage_rate()]),
                )
                .unwrap();

            // 20000 * 0.03 = 600
            assert_eq!(draft.totals.final_amount.to_string(), "600.00");
            let step = draft.steps.first().unwrap();
            assert_eq!(
                step.outcome().amount().unwrap().to_string(),
                "600.00"
            );
        }
    }

    mod determinism {
        use super::*;

        fn rich_rules() -> Vec<FeeRule> {
            vec![
                agency_rule(
                    "TONNAGE",
                    1,
                    ChargeClass::BasePrice,
                    Formula::SimpleMultiplication {
                        rate: dec("0.025"),
                        factors: vec!["grt".to_string(), "days".to_string()],
                    },
                ),
                agency_rule(
                    "BERTH",
                    2,
                    ChargeClass::BasePrice,
                    Formula::TieredPricing {
                        input: "dwt".to_string(),
                        bands: vec![
                            TierBand {
                                upto: Some(dec("10000")),
                                rate: dec("0.05"),
                            },
                            TierBand {
                                upto: None,
                                rate: dec("0.03"),
                            },
                        ],
                    },
                ),
                agency_rule(
                    "VOLUME_DISCOUNT",
                    3,
                    ChargeClass::Discount,
                    Formula::Percentage {
                        base_input: "grt".to_string(),
                        percent: dec("1"),
                    },
                ),
            ]
        }

        #[test]
        fn rerun_is_byte_identical_on_amounts() {
            let snapshot = snapshot_with(rich_rules(), vec![]);
            let req = request(
                ServiceInputs::new()
                    .with("grt", dec("20000"))
                    .with("days", dec("3"))
                    .with("dwt", dec("30000")),
            );
            let engine = CalculationEngine::default();
            let first = engine.calculate(&req, &snapshot).unwrap();
            let second = engine.calculate(&req, &snapshot).unwrap();

            assert_eq!(first.totals, second.totals);
            let amounts =
                |d: &QuotationDraft| -> Vec<Option<Money>> { d.steps.iter().map(CalculationStep::amount).collect() };
            assert_eq!(amounts(&first), amounts(&second));
        }

        #[test]
        fn final_equals_rounded_base_plus_surcharges_minus_discounts_plus_tax() {
            let snapshot = snapshot_with(rich_rules(), vec![]);
            let req = request(
                ServiceInputs::new()
                    .with("grt", dec("20000"))
                    .with("days", dec("3"))
                    .with("dwt", dec("30000")),
            );
            let draft = CalculationEngine::default().calculate(&req, &snapshot).unwrap();
            let t = &draft.totals;
            let recomputed = t
                .base_price
                .safe_add(t.total_surcharges)
                .unwrap()
                .safe_sub(t.total_discounts)
                .unwrap()
                .safe_add(t.tax_amount)
                .unwrap();
            assert_eq!(t.final_amount, recomputed);
        }
    }

    mod conditions {
        use super::*;

        #[test]
        fn condition_excluded_rule_leaves_no_step() {
            let conditional = FeeRule::builder(
                "Deep draft",
                "DEEP_DRAFT",
                ServiceCategory::ShippingAgency,
                ChargeClass::Surcharge,
                Formula::Fixed {
                    amount: dec("250"),
                },
            )
            .conditions(ConditionSet::new(vec![
                Condition::at_least("dwt", dec("50000")).unwrap(),
            ]))
            .try_build(16)
            .unwrap();
            let rules = vec![
                conditional,
                agency_rule(
                    "BASE",
                    0,
                    ChargeClass::BasePrice,
                    Formula::Fixed {
                        amount: dec("1000"),
                    },
                ),
            ];
            let draft = CalculationEngine::default()
                .calculate(
                    &request(ServiceInputs::new().with("dwt", dec("20000"))),
                    &snapshot_with(rules, vec![]),
                )
                .unwrap();
            assert_eq!(draft.steps.len(), 1);
            assert_eq!(draft.totals.final_amount.to_string(), "1000.00");
        }
    }
}
