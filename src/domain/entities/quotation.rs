//! # Quotation Aggregate
//!
//! The priced result of applying all applicable fee rules to a service
//! request.
//!
//! A [`Quotation`] owns its ordered [`CalculationStep`] trail and the
//! aggregate totals, and enforces the lifecycle state machine: only
//! draft quotations may be recalculated, manual overrides are audited
//! with a mandatory reason, and terminal states are immutable.
//!
//! Every mutation bumps the `version` counter used by the repository
//! for optimistic concurrency control.

use crate::domain::entities::calculation_step::CalculationStep;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{
    Currency, CustomerId, Money, PortCode, QuotationId, QuoteStatus, RequestId, ServiceCategory,
    ServiceInputs, StaffId, Timestamp,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The aggregate monetary totals of a quotation.
///
/// Produced by the calculation engine; every field is already rounded
/// to the currency scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationTotals {
    /// Sum of base-price steps.
    pub base_price: Money,
    /// Sum of surcharge steps.
    pub total_surcharges: Money,
    /// Sum of discount steps (positive magnitude).
    pub total_discounts: Money,
    /// `base + surcharges - discounts`, rounded.
    pub subtotal: Money,
    /// Tax applied on the subtotal.
    pub tax_amount: Money,
    /// `subtotal + tax`, rounded.
    pub final_amount: Money,
    /// Currency of every amount above.
    pub currency: Currency,
}

impl QuotationTotals {
    /// Zeroed totals in the given currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self {
            base_price: Money::ZERO,
            total_surcharges: Money::ZERO,
            total_discounts: Money::ZERO,
            subtotal: Money::ZERO,
            tax_amount: Money::ZERO,
            final_amount: Money::ZERO,
            currency,
        }
    }
}

/// A priced quotation for a customer's service request.
///
/// # Lifecycle
///
/// `Draft → Sent → {Accepted, Rejected, Expired}` — see
/// [`QuoteStatus`]. Recalculation is allowed only in `Draft`; a manual
/// override is allowed until a terminal state is reached and always
/// retains the originally calculated amount for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    id: QuotationId,
    quote_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<RequestId>,
    customer_id: CustomerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    staff_id: Option<StaffId>,
    service_category: ServiceCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<PortCode>,
    status: QuoteStatus,
    totals: QuotationTotals,
    overridden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    override_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_calculated_amount: Option<Money>,
    quote_date: NaiveDate,
    valid_until: NaiveDate,
    inputs: ServiceInputs,
    steps: Vec<CalculationStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    responded_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sent_at: Option<Timestamp>,
    created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<Timestamp>,
    version: u64,
}

impl Quotation {
    /// Creates a draft quotation from a completed calculation.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        quote_code: impl Into<String>,
        request_id: Option<RequestId>,
        customer_id: CustomerId,
        staff_id: Option<StaffId>,
        service_category: ServiceCategory,
        port: Option<PortCode>,
        totals: QuotationTotals,
        steps: Vec<CalculationStep>,
        inputs: ServiceInputs,
        quote_date: NaiveDate,
        valid_until: NaiveDate,
    ) -> Self {
        Self {
            id: QuotationId::new_v4(),
            quote_code: quote_code.into(),
            request_id,
            customer_id,
            staff_id,
            service_category,
            port,
            status: QuoteStatus::Draft,
            totals,
            overridden: false,
            override_reason: None,
            original_calculated_amount: None,
            quote_date,
            valid_until,
            inputs,
            steps,
            customer_note: None,
            responded_at: None,
            sent_at: None,
            created_at: Timestamp::now(),
            updated_at: None,
            version: 0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the quotation ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> QuotationId {
        self.id
    }

    /// Returns the human-facing quote code.
    #[inline]
    #[must_use]
    pub fn quote_code(&self) -> &str {
        &self.quote_code
    }

    /// Returns the originating service request, if any.
    #[inline]
    #[must_use]
    pub fn request_id(&self) -> Option<RequestId> {
        self.request_id
    }

    /// Returns the customer the quotation belongs to.
    #[inline]
    #[must_use]
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the staff member who generated the quotation, if any.
    #[inline]
    #[must_use]
    pub fn staff_id(&self) -> Option<StaffId> {
        self.staff_id
    }

    /// Returns the quoted service category.
    #[inline]
    #[must_use]
    pub fn service_category(&self) -> ServiceCategory {
        self.service_category
    }

    /// Returns the request port, if any.
    #[must_use]
    pub fn port(&self) -> Option<&PortCode> {
        self.port.as_ref()
    }

    /// Returns the lifecycle status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    /// Returns the aggregate totals.
    #[inline]
    #[must_use]
    pub fn totals(&self) -> &QuotationTotals {
        &self.totals
    }

    /// Returns the final payable amount.
    #[inline]
    #[must_use]
    pub fn final_amount(&self) -> Money {
        self.totals.final_amount
    }

    /// Returns the quotation currency.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &Currency {
        &self.totals.currency
    }

    /// Returns true if staff manually overrode the computed price.
    #[inline]
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// Returns the override reason, if any.
    #[must_use]
    pub fn override_reason(&self) -> Option<&str> {
        self.override_reason.as_deref()
    }

    /// Returns the originally calculated amount when overridden.
    #[inline]
    #[must_use]
    pub fn original_calculated_amount(&self) -> Option<Money> {
        self.original_calculated_amount
    }

    /// Returns the quote date.
    #[inline]
    #[must_use]
    pub fn quote_date(&self) -> NaiveDate {
        self.quote_date
    }

    /// Returns the last day the customer may accept.
    #[inline]
    #[must_use]
    pub fn valid_until(&self) -> NaiveDate {
        self.valid_until
    }

    /// Returns the request input snapshot.
    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &ServiceInputs {
        &self.inputs
    }

    /// Returns the ordered calculation trail.
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[CalculationStep] {
        &self.steps
    }

    /// Returns the customer's response note, if any.
    #[must_use]
    pub fn customer_note(&self) -> Option<&str> {
        self.customer_note.as_deref()
    }

    /// Returns when the customer responded, if they have.
    #[inline]
    #[must_use]
    pub fn responded_at(&self) -> Option<Timestamp> {
        self.responded_at
    }

    /// Returns when the quotation was sent, if it has been.
    #[inline]
    #[must_use]
    pub fn sent_at(&self) -> Option<Timestamp> {
        self.sent_at
    }

    /// Returns when the quotation was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns the optimistic-concurrency version.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns true if `today` is inside the acceptance window.
    #[inline]
    #[must_use]
    pub fn is_within_validity(&self, today: NaiveDate) -> bool {
        today <= self.valid_until
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Sends the quotation to the customer.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` unless the
    /// quotation is a draft.
    pub fn send(&mut self) -> DomainResult<()> {
        self.transition(QuoteStatus::Sent)?;
        self.sent_at = Some(Timestamp::now());
        Ok(())
    }

    /// Records the customer's acceptance.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` unless the
    /// quotation is sent, and `DomainError::QuotationExpired` when the
    /// validity window has elapsed.
    pub fn accept(&mut self, today: NaiveDate, note: Option<String>) -> DomainResult<()> {
        if self.status == QuoteStatus::Sent && !self.is_within_validity(today) {
            return Err(DomainError::QuotationExpired(self.quote_code.clone()));
        }
        self.transition(QuoteStatus::Accepted)?;
        self.customer_note = note;
        self.responded_at = Some(Timestamp::now());
        Ok(())
    }

    /// Records the customer's rejection.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` unless the
    /// quotation is sent.
    pub fn reject(&mut self, note: Option<String>) -> DomainResult<()> {
        self.transition(QuoteStatus::Rejected)?;
        self.customer_note = note;
        self.responded_at = Some(Timestamp::now());
        Ok(())
    }

    /// Expires a sent quotation whose validity window has elapsed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OperationNotAllowed` while the window is
    /// still open and `DomainError::InvalidStateTransition` unless the
    /// quotation is sent.
    pub fn expire(&mut self, today: NaiveDate) -> DomainResult<()> {
        if self.status == QuoteStatus::Sent && self.is_within_validity(today) {
            return Err(DomainError::OperationNotAllowed(format!(
                "quotation {} is valid until {}",
                self.quote_code, self.valid_until
            )));
        }
        self.transition(QuoteStatus::Expired)
    }

    /// Applies an audited manual price override.
    ///
    /// The originally calculated amount is retained on first override;
    /// subsequent overrides keep the original, not the intermediate
    /// values.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OverrideWithoutReason` for a blank reason
    /// and `DomainError::OperationNotAllowed` once the quotation has
    /// reached a terminal state.
    pub fn override_price(
        &mut self,
        new_amount: Money,
        reason: &str,
        staff: StaffId,
    ) -> DomainResult<()> {
        if reason.trim().is_empty() {
            return Err(DomainError::OverrideWithoutReason);
        }
        if self.status.is_terminal() {
            return Err(DomainError::OperationNotAllowed(format!(
                "quotation {} is {}",
                self.quote_code, self.status
            )));
        }
        if self.original_calculated_amount.is_none() {
            self.original_calculated_amount = Some(self.totals.final_amount);
        }
        self.totals.final_amount = new_amount;
        self.overridden = true;
        self.override_reason = Some(reason.trim().to_string());
        self.staff_id = Some(staff);
        self.touch();
        Ok(())
    }

    /// Replaces totals and steps with a fresh calculation.
    ///
    /// Clears any manual override, since the price has been recomputed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotRecalculable` unless the quotation is a
    /// draft.
    pub fn apply_recalculation(
        &mut self,
        totals: QuotationTotals,
        steps: Vec<CalculationStep>,
        inputs: ServiceInputs,
    ) -> DomainResult<()> {
        if !self.status.is_recalculable() {
            return Err(DomainError::NotRecalculable(format!(
                "quotation {} is {}",
                self.quote_code, self.status
            )));
        }
        self.totals = totals;
        self.steps = steps;
        self.inputs = inputs;
        self.overridden = false;
        self.override_reason = None;
        self.original_calculated_amount = None;
        self.touch();
        Ok(())
    }

    fn transition(&mut self, target: QuoteStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Some(Timestamp::now());
    }
}

impl fmt::Display for Quotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quotation({} {} {} {})",
            self.quote_code,
            self.status,
            self.totals.final_amount,
            self.totals.currency
        )
    }
}
