//! # Quotation Views
//!
//! The two read projections of a quotation.
//!
//! [`QuotationInternalView`] is the staff-facing projection with the
//! full cost breakdown, override metadata and profit margin.
//! [`QuotationExternalView`] is the customer-facing projection and
//! contains only the final payable amount plus the fields needed to
//! respond to the quote.
//!
//! Both views are independent structs built through allow-list mapping
//! functions that copy each permitted field explicitly. The external
//! view is never derived from the internal one, so adding a new
//! confidential field to the model cannot silently leak to customers.

use crate::domain::entities::calculation_step::{CalculationStep, StepOutcome};
use crate::domain::entities::quotation::Quotation;
use crate::domain::value_objects::{
    CallerRole, ChargeClass, Currency, Money, QuotationId, QuoteStatus, Rate, ServiceInputs,
    Timestamp,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// One calculation step as exposed to staff.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationStepView {
    /// Position in the trail.
    pub step_order: u32,
    /// The applied rule's code.
    pub rule_code: String,
    /// The fee component name.
    pub component_name: String,
    /// Base price, surcharge or discount.
    pub charge_class: ChargeClass,
    /// The formula text actually used.
    pub formula_used: String,
    /// Raw input values consulted.
    pub inputs_used: BTreeMap<String, Decimal>,
    /// The step amount; absent for skipped steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    /// The rate actually used, when one was resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_applied: Option<Rate>,
    /// The multiplier actually used, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<Decimal>,
    /// Why the step was skipped, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_reason: Option<String>,
    /// Free-text calculation notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CalculationStepView {
    fn from_step(step: &CalculationStep) -> Self {
        let (amount, rate_applied, multiplier, skipped_reason) = match step.outcome() {
            StepOutcome::Applied {
                amount,
                rate_applied,
                multiplier,
                ..
            } => (Some(*amount), *rate_applied, *multiplier, None),
            StepOutcome::Skipped { reason } => (None, None, None, Some(reason.clone())),
        };
        Self {
            step_order: step.step_order(),
            rule_code: step.rule_code().to_string(),
            component_name: step.component_name().to_string(),
            charge_class: step.charge_class(),
            formula_used: step.formula_used().to_string(),
            inputs_used: step.inputs_used().clone(),
            amount,
            rate_applied,
            multiplier,
            skipped_reason,
            notes: step.notes().map(ToString::to_string),
        }
    }
}

/// Staff-facing projection: full breakdown, override metadata and
/// profit margin. Never returned to customers or guests.
#[derive(Debug, Clone, Serialize)]
pub struct QuotationInternalView {
    /// Quotation identifier.
    pub id: QuotationId,
    /// Human-facing quote code.
    pub quote_code: String,
    /// Lifecycle status.
    pub status: QuoteStatus,
    /// The quoted service line.
    pub service_category: String,
    /// Port of call, when the request had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// Sum of base-price steps.
    pub base_price: Money,
    /// Sum of surcharge steps.
    pub total_surcharges: Money,
    /// Sum of discount steps.
    pub total_discounts: Money,
    /// Net subtotal.
    pub subtotal: Money,
    /// Tax on the subtotal.
    pub tax_amount: Money,
    /// Final payable amount.
    pub final_amount: Money,
    /// Quotation currency.
    pub currency: Currency,
    /// True when staff overrode the computed price.
    pub is_overridden: bool,
    /// The override justification, when overridden.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
    /// The originally calculated amount, when overridden.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_calculated_amount: Option<Money>,
    /// Quote issue date.
    pub quote_date: NaiveDate,
    /// Last day the customer may accept.
    pub valid_until: NaiveDate,
    /// When the quotation was sent, if it has been.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<Timestamp>,
    /// The request input snapshot.
    pub inputs: ServiceInputs,
    /// The full ordered calculation trail.
    pub steps: Vec<CalculationStepView>,
    /// The internal cost baseline the margin is computed against.
    pub cost_baseline: Money,
    /// `final_amount - cost_baseline`; negative when quoting below cost.
    pub profit_margin: Decimal,
    /// The customer's response note, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_note: Option<String>,
    /// When the customer responded, if they have.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<Timestamp>,
}

/// Customer-facing projection: only the final payable amount and the
/// fields needed to respond. Built by allow-list copying, never by
/// stripping the internal view.
#[derive(Debug, Clone, Serialize)]
pub struct QuotationExternalView {
    /// Quotation identifier.
    pub id: QuotationId,
    /// Human-facing quote code.
    pub quote_code: String,
    /// Lifecycle status.
    pub status: QuoteStatus,
    /// Short service description for display.
    pub service_summary: String,
    /// The final payable amount.
    pub final_amount: Money,
    /// Quotation currency.
    pub currency: Currency,
    /// Quote issue date.
    pub quote_date: NaiveDate,
    /// Last day the customer may accept.
    pub valid_until: NaiveDate,
    /// True if the customer may accept right now.
    pub can_accept: bool,
    /// True if the customer may reject right now.
    pub can_reject: bool,
}

/// A quotation projection selected by caller role.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QuotationView {
    /// The staff projection.
    Internal(QuotationInternalView),
    /// The customer projection.
    External(QuotationExternalView),
}

/// Builds the staff-facing projection.
///
/// `cost_baseline` is the internal cost the margin is computed
/// against; it never leaves this projection.
#[must_use]
pub fn internal_view(quotation: &Quotation, cost_baseline: Money) -> QuotationInternalView {
    let totals = quotation.totals();
    QuotationInternalView {
        id: quotation.id(),
        quote_code: quotation.quote_code().to_string(),
        status: quotation.status(),
        service_category: quotation.service_category().to_string(),
        port: quotation.port().map(ToString::to_string),
        base_price: totals.base_price,
        total_surcharges: totals.total_surcharges,
        total_discounts: totals.total_discounts,
        subtotal: totals.subtotal,
        tax_amount: totals.tax_amount,
        final_amount: totals.final_amount,
        currency: totals.currency.clone(),
        is_overridden: quotation.is_overridden(),
        override_reason: quotation.override_reason().map(ToString::to_string),
        original_calculated_amount: quotation.original_calculated_amount(),
        quote_date: quotation.quote_date(),
        valid_until: quotation.valid_until(),
        sent_at: quotation.sent_at(),
        inputs: quotation.inputs().clone(),
        steps: quotation
            .steps()
            .iter()
            .map(CalculationStepView::from_step)
            .collect(),
        cost_baseline,
        profit_margin: totals.final_amount.get() - cost_baseline.get(),
        customer_note: quotation.customer_note().map(ToString::to_string),
        responded_at: quotation.responded_at(),
    }
}

/// Builds the customer-facing projection.
///
/// Only the fields listed here are ever copied; breakdown fields,
/// override metadata, margins and steps have no counterpart in the
/// struct at all.
#[must_use]
pub fn external_view(quotation: &Quotation, today: NaiveDate) -> QuotationExternalView {
    let respondable = quotation.status() == QuoteStatus::Sent && quotation.is_within_validity(today);
    let service_summary = match quotation.port() {
        Some(port) => format!("{} at {}", quotation.service_category(), port),
        None => quotation.service_category().to_string(),
    };
    QuotationExternalView {
        id: quotation.id(),
        quote_code: quotation.quote_code().to_string(),
        status: quotation.status(),
        service_summary,
        final_amount: quotation.final_amount(),
        currency: quotation.currency().clone(),
        quote_date: quotation.quote_date(),
        valid_until: quotation.valid_until(),
        can_accept: respondable,
        can_reject: respondable,
    }
}

/// Selects the projection for a caller role.
///
/// Staff receive the internal view; customers and guests receive the
/// sanitized external view.
#[must_use]
pub fn view_for_role(
    quotation: &Quotation,
    role: CallerRole,
    cost_baseline: Money,
    today: NaiveDate,
) -> QuotationView {
    if role.can_view_breakdown() {
        QuotationView::Internal(internal_view(quotation, cost_baseline))
    } else {
        QuotationView::External(external_view(quotation, today))
    }
}
