//! # Saved Estimate
//!
//! An ephemeral, unauthenticated price preview.
//!
//! Guests receive a final price without any breakdown; the platform
//! keeps a [`SavedEstimate`] with a fixed time-to-live so the guest can
//! come back and convert it into a real service request. Expired,
//! unconverted estimates are garbage-collected by a background sweep;
//! a converted estimate is permanently retained.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{
    Currency, EstimateCode, EstimateId, Money, RequestId, ServiceCategory, ServiceInputs,
    Timestamp,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ephemeral guest estimate.
///
/// # Invariants
///
/// - `expires_at` is after `created_at`
/// - Once `converted_to` is set it never changes, and the record is
///   exempt from the expiry sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEstimate {
    id: EstimateId,
    estimate_code: EstimateCode,
    service_category: ServiceCategory,
    inputs: ServiceInputs,
    estimated_price: Money,
    currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    created_at: Timestamp,
    expires_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    converted_to: Option<RequestId>,
}

impl SavedEstimate {
    /// Creates an estimate valid for `ttl_days` from now.
    #[must_use]
    pub fn new(
        estimate_code: EstimateCode,
        service_category: ServiceCategory,
        inputs: ServiceInputs,
        estimated_price: Money,
        currency: Currency,
        ttl_days: i64,
    ) -> Self {
        let created_at = Timestamp::now();
        Self {
            id: EstimateId::new_v4(),
            estimate_code,
            service_category,
            inputs,
            estimated_price,
            currency,
            email: None,
            session_id: None,
            created_at,
            expires_at: created_at.add_days(ttl_days),
            converted_to: None,
        }
    }

    /// Attaches the guest's contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attaches the guest's session id.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Returns the estimate ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EstimateId {
        self.id
    }

    /// Returns the human-facing estimate code.
    #[inline]
    #[must_use]
    pub fn estimate_code(&self) -> &EstimateCode {
        &self.estimate_code
    }

    /// Returns the estimated service category.
    #[inline]
    #[must_use]
    pub fn service_category(&self) -> ServiceCategory {
        self.service_category
    }

    /// Returns the raw input snapshot.
    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &ServiceInputs {
        &self.inputs
    }

    /// Returns the computed final price.
    #[inline]
    #[must_use]
    pub fn estimated_price(&self) -> Money {
        self.estimated_price
    }

    /// Returns the estimate currency.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Returns the guest's email, if given.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the guest's session id, if given.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns when the estimate was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns when the estimate expires.
    #[inline]
    #[must_use]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Returns the linked request, once converted.
    #[inline]
    #[must_use]
    pub fn converted_to(&self) -> Option<RequestId> {
        self.converted_to
    }

    /// Returns true if the estimate has been converted to a request.
    #[inline]
    #[must_use]
    pub fn is_converted(&self) -> bool {
        self.converted_to.is_some()
    }

    /// Returns true if `now` is past the expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now.is_after(&self.expires_at)
    }

    /// Returns true if the expiry sweep may delete this record.
    ///
    /// Sweepable means expired, never converted, and created before the
    /// sweep started its scan (a record created mid-sweep is left for
    /// the next run).
    #[must_use]
    pub fn is_sweepable(&self, now: Timestamp, scan_started: Timestamp) -> bool {
        self.is_expired_at(now) && !self.is_converted() && !self.created_at.is_after(&scan_started)
    }

    /// Links the estimate to a created service request.
    ///
    /// Conversion permanently exempts the record from the expiry sweep.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EstimateExpired` for an expired,
    /// unconverted estimate and `DomainError::AlreadyConverted` when a
    /// link already exists.
    pub fn convert(&mut self, request_id: RequestId, now: Timestamp) -> DomainResult<()> {
        if self.is_converted() {
            return Err(DomainError::AlreadyConverted(
                self.estimate_code.to_string(),
            ));
        }
        if self.is_expired_at(now) {
            return Err(DomainError::EstimateExpired(self.estimate_code.to_string()));
        }
        self.converted_to = Some(request_id);
        Ok(())
    }
}

impl fmt::Display for SavedEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Estimate({} {} {} {})",
            self.estimate_code, self.service_category, self.estimated_price, self.currency
        )
    }
}
