//! # Estimate Service
//!
//! Guest-facing price estimation.
//!
//! Runs the same calculation orchestration as the staff workflow but
//! discards the audit trail before returning — no confidential detail
//! ever leaves this path. Each estimate is persisted with a fixed
//! time-to-live; an idempotent background sweep removes expired
//! estimates that were never converted to a real request.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::calculation::{CalculationEngine, CalculationRequest};
use crate::application::services::pricing_snapshot::PricingSnapshot;
use crate::domain::entities::saved_estimate::SavedEstimate;
use crate::domain::value_objects::{
    Currency, EstimateCode, Money, RequestId, ServiceCategory, Timestamp,
};
use crate::infrastructure::persistence::traits::{
    FeeRuleRepository, RateTableRepository, SavedEstimateRepository,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Default estimate time-to-live in days.
pub const DEFAULT_ESTIMATE_TTL_DAYS: i64 = 7;

/// What a guest receives: a code, a price, nothing else.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateResult {
    /// The code the guest can use to convert the estimate later.
    pub code: EstimateCode,
    /// The computed final price.
    pub final_price: Money,
    /// The price currency.
    pub currency: Currency,
    /// How many days the estimate stays valid.
    pub valid_for_days: i64,
}

/// Guest-facing estimation workflow.
#[derive(Debug, Clone)]
pub struct EstimateService {
    fee_rules: Arc<dyn FeeRuleRepository>,
    rates: Arc<dyn RateTableRepository>,
    estimates: Arc<dyn SavedEstimateRepository>,
    engine: CalculationEngine,
    ttl_days: i64,
}

impl EstimateService {
    /// Creates the workflow over its collaborator ports.
    #[must_use]
    pub fn new(
        fee_rules: Arc<dyn FeeRuleRepository>,
        rates: Arc<dyn RateTableRepository>,
        estimates: Arc<dyn SavedEstimateRepository>,
        engine: CalculationEngine,
        ttl_days: i64,
    ) -> Self {
        Self {
            fee_rules,
            rates,
            estimates,
            engine,
            ttl_days,
        }
    }

    /// Returns the configured time-to-live in days.
    #[inline]
    #[must_use]
    pub const fn ttl_days(&self) -> i64 {
        self.ttl_days
    }

    /// Computes a guest estimate and persists the saved record.
    ///
    /// The calculation trail is discarded before returning; only the
    /// final price leaves this path.
    ///
    /// # Errors
    ///
    /// Returns the user-visible "no pricing available" condition when
    /// no rule applies, and propagates persistence failures.
    #[instrument(skip(self, request), fields(category = %request.service_category))]
    pub async fn estimate(
        &self,
        request: CalculationRequest,
        email: Option<String>,
        session_id: Option<String>,
    ) -> ApplicationResult<EstimateResult> {
        let snapshot = self.load_snapshot(request.service_category).await?;
        let draft = self.engine.calculate(&request, &snapshot)?;

        let sequence = self.estimates.count().await? + 1;
        let code = EstimateCode::new(format!(
            "EST-{}-{:04}",
            Timestamp::now().to_code_date(),
            sequence
        ));

        // The trail stays behind: only totals survive into the record.
        let mut estimate = SavedEstimate::new(
            code.clone(),
            draft.service_category,
            draft.inputs,
            draft.totals.final_amount,
            draft.totals.currency.clone(),
            self.ttl_days,
        );
        if let Some(email) = email {
            estimate = estimate.with_email(email);
        }
        if let Some(session_id) = session_id {
            estimate = estimate.with_session_id(session_id);
        }
        self.estimates.save(&estimate).await?;

        info!(code = %code, price = %estimate.estimated_price(), "estimate saved");

        Ok(EstimateResult {
            code,
            final_price: estimate.estimated_price(),
            currency: estimate.currency().clone(),
            valid_for_days: self.ttl_days,
        })
    }

    /// Converts a live estimate into a real service request link.
    ///
    /// Conversion permanently exempts the record from the expiry sweep.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` for an unknown code, the
    /// "please recalculate" expiry error for an expired estimate, and a
    /// state error for a second conversion.
    pub async fn convert(
        &self,
        code: &EstimateCode,
        request_id: RequestId,
    ) -> ApplicationResult<SavedEstimate> {
        let mut estimate = self
            .estimates
            .find_by_code(code)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Estimate", code.to_string()))?;
        estimate.convert(request_id, Timestamp::now())?;
        self.estimates.save(&estimate).await?;
        info!(code = %code, request = %request_id, "estimate converted");
        Ok(estimate)
    }

    /// Deletes expired, unconverted estimates.
    ///
    /// Idempotent and repeatable; records created after the sweep
    /// started its scan are left for the next run.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn sweep_expired(&self) -> ApplicationResult<u64> {
        let scan_started = Timestamp::now();
        let deleted = self
            .estimates
            .delete_sweepable(scan_started, scan_started)
            .await?;
        if deleted > 0 {
            info!(deleted, "expired estimates swept");
        }
        Ok(deleted)
    }

    async fn load_snapshot(
        &self,
        category: ServiceCategory,
    ) -> ApplicationResult<PricingSnapshot> {
        let rules = self.fee_rules.find_active_by_category(category).await?;
        let rates = self.rates.find_active().await?;
        Ok(PricingSnapshot::new(rules, rates))
    }
}
