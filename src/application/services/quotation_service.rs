//! # Quotation Workflow
//!
//! The staff-facing quotation workflow: generate from a request,
//! recalculate drafts, run the lifecycle, apply audited overrides and
//! project role-appropriate views.
//!
//! Every calculation runs against a [`PricingSnapshot`] taken once at
//! the start of the workflow call. Every mutation is persisted through
//! an optimistic version check, so conflicting concurrent staff actions
//! fail one side with a retryable conflict instead of interleaving.

use crate::application::dto::quotation_views::{QuotationView, view_for_role};
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::assembler::QuotationAssembler;
use crate::application::services::calculation::{CalculationEngine, CalculationRequest};
use crate::application::services::pricing_snapshot::PricingSnapshot;
use crate::domain::entities::quotation::Quotation;
use crate::domain::value_objects::{
    CallerRole, CustomerId, Money, QuotationId, RequestId, ServiceCategory, StaffId, Timestamp,
};
use crate::infrastructure::persistence::traits::{
    FeeRuleRepository, QuotationRepository, RateTableRepository,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Orchestrates quotation generation, lifecycle and projection.
#[derive(Debug, Clone)]
pub struct QuotationService {
    fee_rules: Arc<dyn FeeRuleRepository>,
    rates: Arc<dyn RateTableRepository>,
    quotations: Arc<dyn QuotationRepository>,
    engine: CalculationEngine,
    assembler: QuotationAssembler,
}

impl QuotationService {
    /// Creates the workflow over its collaborator ports.
    #[must_use]
    pub fn new(
        fee_rules: Arc<dyn FeeRuleRepository>,
        rates: Arc<dyn RateTableRepository>,
        quotations: Arc<dyn QuotationRepository>,
        engine: CalculationEngine,
        assembler: QuotationAssembler,
    ) -> Self {
        Self {
            fee_rules,
            rates,
            quotations,
            engine,
            assembler,
        }
    }

    /// Takes one consistent snapshot of the pricing configuration.
    ///
    /// # Errors
    ///
    /// Propagates repository failures as infrastructure errors.
    pub async fn load_snapshot(
        &self,
        category: ServiceCategory,
    ) -> ApplicationResult<PricingSnapshot> {
        let rules = self.fee_rules.find_active_by_category(category).await?;
        let rates = self.rates.find_active().await?;
        Ok(PricingSnapshot::new(rules, rates))
    }

    /// Calculates, assembles and persists a draft quotation.
    ///
    /// # Errors
    ///
    /// Returns the user-visible "no pricing available" condition when
    /// no rule applies, and propagates persistence failures.
    #[instrument(skip(self, request), fields(category = %request.service_category))]
    pub async fn generate(
        &self,
        customer_id: CustomerId,
        staff_id: Option<StaffId>,
        request_id: Option<RequestId>,
        request: CalculationRequest,
    ) -> ApplicationResult<Quotation> {
        let snapshot = self.load_snapshot(request.service_category).await?;
        let draft = self.engine.calculate(&request, &snapshot)?;
        let sequence = self.quotations.count().await? + 1;
        let quotation = self
            .assembler
            .assemble(draft, customer_id, staff_id, request_id, sequence);
        self.quotations.insert(&quotation).await?;
        info!(quote_code = %quotation.quote_code(), "quotation generated");
        Ok(quotation)
    }

    /// Re-runs the engine for a draft quotation against a fresh
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Fails with a state error for non-draft quotations and a
    /// retryable conflict when a concurrent writer got there first.
    pub async fn recalculate(
        &self,
        id: QuotationId,
        request: CalculationRequest,
    ) -> ApplicationResult<Quotation> {
        let mut quotation = self.get(id).await?;
        let expected = quotation.version();
        let snapshot = self.load_snapshot(request.service_category).await?;
        let draft = self.engine.calculate(&request, &snapshot)?;
        quotation.apply_recalculation(draft.totals, draft.steps, draft.inputs)?;
        self.quotations.update(&quotation, expected).await?;
        Ok(quotation)
    }

    /// Loads a quotation.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` for an unknown id.
    pub async fn get(&self, id: QuotationId) -> ApplicationResult<Quotation> {
        self.quotations
            .get(&id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Quotation", id.to_string()))
    }

    /// Projects a quotation for the caller's role.
    ///
    /// Staff receive the internal breakdown with the margin computed
    /// against `cost_baseline` (zero when the caller supplies none);
    /// everyone else receives the sanitized external view.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` for an unknown id.
    pub async fn view(
        &self,
        id: QuotationId,
        role: CallerRole,
        cost_baseline: Option<Money>,
    ) -> ApplicationResult<QuotationView> {
        let quotation = self.get(id).await?;
        let today = Timestamp::now().date();
        Ok(view_for_role(
            &quotation,
            role,
            cost_baseline.unwrap_or(Money::ZERO),
            today,
        ))
    }

    /// Sends a draft quotation to the customer.
    ///
    /// # Errors
    ///
    /// Fails with a state error outside `Draft` and a retryable
    /// conflict on concurrent modification.
    pub async fn send(&self, id: QuotationId) -> ApplicationResult<Quotation> {
        self.mutate(id, |q| q.send()).await
    }

    /// Records the owning customer's acceptance.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Unauthorized` when `customer_id` does
    /// not own the quotation, a state error outside `Sent`, and the
    /// expiry error past the validity window.
    pub async fn accept(
        &self,
        id: QuotationId,
        customer_id: CustomerId,
        note: Option<String>,
    ) -> ApplicationResult<Quotation> {
        let today = Timestamp::now().date();
        self.mutate_owned(id, customer_id, move |q| q.accept(today, note.clone()))
            .await
    }

    /// Records the owning customer's rejection.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Unauthorized` for a foreign customer
    /// and a state error outside `Sent`.
    pub async fn reject(
        &self,
        id: QuotationId,
        customer_id: CustomerId,
        note: Option<String>,
    ) -> ApplicationResult<Quotation> {
        self.mutate_owned(id, customer_id, move |q| q.reject(note.clone()))
            .await
    }

    /// Expires a sent quotation whose validity window has elapsed.
    ///
    /// # Errors
    ///
    /// Fails while the window is still open.
    pub async fn expire(&self, id: QuotationId) -> ApplicationResult<Quotation> {
        let today = Timestamp::now().date();
        self.mutate(id, move |q| q.expire(today)).await
    }

    /// Applies an audited staff override of the final amount.
    ///
    /// # Errors
    ///
    /// Rejects a blank reason before any persistence and fails on
    /// terminal quotations.
    pub async fn override_price(
        &self,
        id: QuotationId,
        staff_id: StaffId,
        amount: Money,
        reason: &str,
    ) -> ApplicationResult<Quotation> {
        self.mutate(id, move |q| q.override_price(amount, reason, staff_id))
            .await
    }

    /// Lists a customer's quotations.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> ApplicationResult<Vec<Quotation>> {
        Ok(self.quotations.find_by_customer(&customer_id).await?)
    }

    async fn mutate<F>(&self, id: QuotationId, op: F) -> ApplicationResult<Quotation>
    where
        F: FnOnce(&mut Quotation) -> crate::domain::errors::DomainResult<()>,
    {
        let mut quotation = self.get(id).await?;
        let expected = quotation.version();
        op(&mut quotation)?;
        self.quotations.update(&quotation, expected).await?;
        Ok(quotation)
    }

    async fn mutate_owned<F>(
        &self,
        id: QuotationId,
        customer_id: CustomerId,
        op: F,
    ) -> ApplicationResult<Quotation>
    where
        F: FnOnce(&mut Quotation) -> crate::domain::errors::DomainResult<()>,
    {
        let mut quotation = self.get(id).await?;
        if quotation.customer_id() != customer_id {
            return Err(ApplicationError::Unauthorized);
        }
        let expected = quotation.version();
        op(&mut quotation)?;
        self.quotations.update(&quotation, expected).await?;
        Ok(quotation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::entities::fee_rule::FeeRule;
    use crate::domain::formula::Formula;
    use crate::domain::value_objects::{ChargeClass, QuoteStatus, ServiceInputs};
    use crate::infrastructure::persistence::in_memory::{
        InMemoryFeeRuleRepository, InMemoryQuotationRepository, InMemoryRateTableRepository,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn money(s: &str) -> Money {
        Money::new(dec(s)).unwrap()
    }

    async fn service_with_rules(rules: Vec<FeeRule>) -> QuotationService {
        let fee_rules = Arc::new(InMemoryFeeRuleRepository::new());
        for rule in &rules {
            fee_rules.save(rule).await.unwrap();
        }
        QuotationService::new(
            fee_rules,
            Arc::new(InMemoryRateTableRepository::new()),
            Arc::new(InMemoryQuotationRepository::new()),
            CalculationEngine::default(),
            QuotationAssembler::default(),
        )
    }

    fn agency_rule() -> FeeRule {
        FeeRule::builder(
            "Agency Fee",
            "AGENCY_FEE",
            ServiceCategory::ShippingAgency,
            ChargeClass::BasePrice,
            Formula::BasePlusVariable {
                base: dec("400"),
                rate: dec("0.15"),
                variable: "grt".to_string(),
            },
        )
        .try_build(16)
        .unwrap()
    }

    fn request() -> CalculationRequest {
        CalculationRequest {
            service_category: ServiceCategory::ShippingAgency,
            port: None,
            destination: None,
            as_of: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            inputs: ServiceInputs::new().with("grt", dec("20000")),
        }
    }

    #[tokio::test]
    async fn generate_persists_a_priced_draft() {
        let service = service_with_rules(vec![agency_rule()]).await;
        let quotation = service
            .generate(CustomerId::new_v4(), None, None, request())
            .await
            .unwrap();

        assert_eq!(quotation.status(), QuoteStatus::Draft);
        assert_eq!(quotation.final_amount(), money("3400"));
        let reloaded = service.get(quotation.id()).await.unwrap();
        assert_eq!(reloaded.final_amount(), money("3400"));
    }

    #[tokio::test]
    async fn generate_without_rules_reports_no_pricing() {
        let service = service_with_rules(vec![]).await;
        let result = service
            .generate(CustomerId::new_v4(), None, None, request())
            .await;
        assert!(result.as_ref().err().map(ApplicationError::is_no_pricing).unwrap_or(false));
    }

    #[tokio::test]
    async fn accept_requires_the_owning_customer() {
        let service = service_with_rules(vec![agency_rule()]).await;
        let owner = CustomerId::new_v4();
        let quotation = service.generate(owner, None, None, request()).await.unwrap();
        service.send(quotation.id()).await.unwrap();

        let stranger = CustomerId::new_v4();
        let result = service.accept(quotation.id(), stranger, None).await;
        assert!(matches!(result, Err(ApplicationError::Unauthorized)));

        let accepted = service.accept(quotation.id(), owner, None).await.unwrap();
        assert_eq!(accepted.status(), QuoteStatus::Accepted);
    }

    #[tokio::test]
    async fn stale_writer_gets_retryable_conflict() {
        let service = service_with_rules(vec![agency_rule()]).await;
        let quotation = service
            .generate(CustomerId::new_v4(), None, None, request())
            .await
            .unwrap();

        // Two staff members load the same draft; the second save must fail.
        let stale = service.get(quotation.id()).await.unwrap();
        service.send(quotation.id()).await.unwrap();

        let mut stale = stale;
        stale
            .override_price(money("1000"), "race", StaffId::new_v4())
            .unwrap();
        let result = service
            .quotations
            .update(&stale, 0)
            .await
            .map_err(ApplicationError::from);
        assert!(matches!(result, Err(ref e) if e.is_retryable()));
    }

    #[tokio::test]
    async fn override_then_view_keeps_original_for_staff_only() {
        let service = service_with_rules(vec![agency_rule()]).await;
        let quotation = service
            .generate(CustomerId::new_v4(), None, None, request())
            .await
            .unwrap();
        service
            .override_price(quotation.id(), StaffId::new_v4(), money("3000"), "negotiated")
            .await
            .unwrap();

        let staff_view = service
            .view(quotation.id(), CallerRole::Staff, Some(money("2500")))
            .await
            .unwrap();
        let QuotationView::Internal(internal) = staff_view else {
            panic!("staff must get the internal view");
        };
        assert_eq!(internal.original_calculated_amount, Some(money("3400")));
        assert_eq!(internal.profit_margin, dec("500"));

        let customer_view = service
            .view(quotation.id(), CallerRole::Customer, None)
            .await
            .unwrap();
        let QuotationView::External(external) = customer_view else {
            panic!("customers must get the external view");
        };
        assert_eq!(external.final_amount, money("3000"));
    }

    #[tokio::test]
    async fn recalculate_rejects_sent_quotations() {
        let service = service_with_rules(vec![agency_rule()]).await;
        let quotation = service
            .generate(CustomerId::new_v4(), None, None, request())
            .await
            .unwrap();
        service.send(quotation.id()).await.unwrap();

        let result = service.recalculate(quotation.id(), request()).await;
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(
                crate::domain::errors::DomainError::NotRecalculable(_)
            ))
        ));
    }
}
