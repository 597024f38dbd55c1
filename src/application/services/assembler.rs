//! # Quotation Assembler
//!
//! Packages a completed calculation into a [`Quotation`] aggregate.
//!
//! The assembler stamps the human-facing quote code, the issue date and
//! the customer acceptance window; projections of the assembled
//! aggregate live in [`crate::application::dto::quotation_views`].

use crate::application::services::calculation::QuotationDraft;
use crate::domain::entities::quotation::Quotation;
use crate::domain::value_objects::{CustomerId, RequestId, StaffId, Timestamp};
use tracing::info;

/// Default customer acceptance window in days.
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

/// Assembles quotation aggregates from calculation drafts.
#[derive(Debug, Clone, Copy)]
pub struct QuotationAssembler {
    validity_days: i64,
}

impl QuotationAssembler {
    /// Creates an assembler with an explicit acceptance window.
    #[must_use]
    pub const fn new(validity_days: i64) -> Self {
        Self { validity_days }
    }

    /// Returns the configured acceptance window in days.
    #[inline]
    #[must_use]
    pub const fn validity_days(&self) -> i64 {
        self.validity_days
    }

    /// Packages a draft into a quotation aggregate.
    ///
    /// `sequence` feeds the daily quote-code counter
    /// (`QT-YYYYMMDD-NNNN`).
    #[must_use]
    pub fn assemble(
        &self,
        draft: QuotationDraft,
        customer_id: CustomerId,
        staff_id: Option<StaffId>,
        request_id: Option<RequestId>,
        sequence: u64,
    ) -> Quotation {
        let now = Timestamp::now();
        let quote_code = format!("QT-{}-{:04}", now.to_code_date(), sequence);
        let quote_date = now.date();
        let valid_until = now.add_days(self.validity_days).date();

        let quotation = Quotation::new(
            quote_code,
            request_id,
            customer_id,
            staff_id,
            draft.service_category,
            draft.port,
            draft.totals,
            draft.steps,
            draft.inputs,
            quote_date,
            valid_until,
        );

        info!(
            quote_code = %quotation.quote_code(),
            category = %quotation.service_category(),
            final_amount = %quotation.final_amount(),
            "quotation assembled"
        );

        quotation
    }
}

impl Default for QuotationAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDITY_DAYS)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::quotation::QuotationTotals;
    use crate::domain::value_objects::{
        Currency, QuoteStatus, ServiceCategory, ServiceInputs,
    };
    use chrono::NaiveDate;

    fn draft() -> QuotationDraft {
        QuotationDraft {
            service_category: ServiceCategory::Chartering,
            port: None,
            as_of: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            inputs: ServiceInputs::new(),
            steps: Vec::new(),
            totals: QuotationTotals::zero(Currency::usd()),
        }
    }

    #[test]
    fn assembled_quotation_is_a_draft() {
        let quotation = QuotationAssembler::default().assemble(
            draft(),
            CustomerId::new_v4(),
            None,
            None,
            1,
        );
        assert_eq!(quotation.status(), QuoteStatus::Draft);
        assert_eq!(quotation.version(), 0);
    }

    #[test]
    fn quote_code_carries_date_and_sequence() {
        let quotation = QuotationAssembler::default().assemble(
            draft(),
            CustomerId::new_v4(),
            None,
            None,
            42,
        );
        let expected_prefix = format!("QT-{}-0042", Timestamp::now().to_code_date());
        assert_eq!(quotation.quote_code(), expected_prefix);
    }

    #[test]
    fn validity_window_follows_configuration() {
        let quotation = QuotationAssembler::new(14).assemble(
            draft(),
            CustomerId::new_v4(),
            None,
            None,
            1,
        );
        let expected = Timestamp::now().add_days(14).date();
        assert_eq!(quotation.valid_until(), expected);
    }
}
