//! # Rate Table Entry
//!
//! A time-bounded, route-scoped base rate.
//!
//! Rate table entries supply the market rates fee formulas draw on:
//! each is scoped to a service category and rate category, optionally
//! to a route, and valid inside a `[valid_from, valid_to]` window where
//! `valid_to` may be open-ended.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{
    Currency, PortCode, Rate, RateEntryId, ServiceCategory, Timestamp,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A time-bounded, route-scoped rate.
///
/// # Invariants
///
/// - `valid_to`, when present, is not before `valid_from`
/// - `rate_category` is upper-case
/// - An absent `to_location` means the rate applies regardless of
///   destination (wildcard)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTableEntry {
    id: RateEntryId,
    service_category: ServiceCategory,
    rate_category: String,
    rate_name: String,
    from_location: PortCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_location: Option<PortCode>,
    base_rate: Rate,
    currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    valid_from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_to: Option<NaiveDate>,
    active: bool,
    created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<Timestamp>,
}

impl RateTableEntry {
    /// Returns a builder for constructing an entry.
    #[must_use]
    pub fn builder(
        service_category: ServiceCategory,
        rate_category: impl Into<String>,
        rate_name: impl Into<String>,
        from_location: PortCode,
        base_rate: Rate,
        valid_from: NaiveDate,
    ) -> RateTableEntryBuilder {
        RateTableEntryBuilder::new(
            service_category,
            rate_category,
            rate_name,
            from_location,
            base_rate,
            valid_from,
        )
    }

    /// Returns the entry ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RateEntryId {
        self.id
    }

    /// Returns the owning service category.
    #[inline]
    #[must_use]
    pub fn service_category(&self) -> ServiceCategory {
        self.service_category
    }

    /// Returns the rate category (e.g. `PILOTAGE`, `BERTH`).
    #[inline]
    #[must_use]
    pub fn rate_category(&self) -> &str {
        &self.rate_category
    }

    /// Returns the human-facing rate name.
    #[inline]
    #[must_use]
    pub fn rate_name(&self) -> &str {
        &self.rate_name
    }

    /// Returns the route origin.
    #[inline]
    #[must_use]
    pub fn from_location(&self) -> &PortCode {
        &self.from_location
    }

    /// Returns the route destination; `None` is a wildcard.
    #[must_use]
    pub fn to_location(&self) -> Option<&PortCode> {
        self.to_location.as_ref()
    }

    /// Returns the base rate.
    #[inline]
    #[must_use]
    pub fn base_rate(&self) -> Rate {
        self.base_rate
    }

    /// Returns the currency the rate is expressed in.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Returns the unit the rate applies per (e.g. `per GRT per day`).
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Returns the start of the validity window.
    #[inline]
    #[must_use]
    pub fn valid_from(&self) -> NaiveDate {
        self.valid_from
    }

    /// Returns the end of the validity window; `None` is open-ended.
    #[inline]
    #[must_use]
    pub fn valid_to(&self) -> Option<NaiveDate> {
        self.valid_to
    }

    /// Returns true if the entry is active.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns when the entry was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns true if `as_of` falls inside the validity window.
    ///
    /// # Examples
    ///
    /// ```
    /// use seaquote::domain::entities::rate_entry::RateTableEntry;
    /// use seaquote::domain::value_objects::{PortCode, Rate, ServiceCategory};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let entry = RateTableEntry::builder(
    ///     ServiceCategory::Chartering,
    ///     "VOYAGE_CHARTER",
    ///     "Voyage base",
    ///     PortCode::new("HAIPHONG"),
    ///     Rate::new(Decimal::new(15_000, 0)).unwrap(),
    ///     NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
    /// )
    /// .try_build()
    /// .unwrap();
    ///
    /// let aug = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
    /// assert!(entry.is_in_window(aug));
    /// ```
    #[must_use]
    pub fn is_in_window(&self, as_of: NaiveDate) -> bool {
        if as_of < self.valid_from {
            return false;
        }
        match self.valid_to {
            Some(end) => as_of <= end,
            None => true,
        }
    }

    /// Returns true if the entry covers the given route.
    ///
    /// The origin must match exactly. A wildcard entry (no
    /// `to_location`) covers any destination; an explicit entry
    /// requires an exactly matching destination.
    #[must_use]
    pub fn matches_route(&self, from: &PortCode, to: Option<&PortCode>) -> bool {
        if &self.from_location != from {
            return false;
        }
        match (&self.to_location, to) {
            (None, _) => true,
            (Some(entry_to), Some(query_to)) => entry_to == query_to,
            (Some(_), None) => false,
        }
    }

    /// Returns true if the entry names an explicit destination.
    #[inline]
    #[must_use]
    pub fn has_explicit_destination(&self) -> bool {
        self.to_location.is_some()
    }

    /// Deactivates the entry, stamping `updated_at`.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Some(Timestamp::now());
    }
}

impl fmt::Display for RateTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.to_location {
            Some(to) => write!(
                f,
                "Rate({}/{} {} -> {} @ {})",
                self.service_category, self.rate_category, self.from_location, to, self.base_rate
            ),
            None => write!(
                f,
                "Rate({}/{} {} -> * @ {})",
                self.service_category, self.rate_category, self.from_location, self.base_rate
            ),
        }
    }
}

/// Builder for constructing [`RateTableEntry`] instances.
#[derive(Debug, Clone)]
pub struct RateTableEntryBuilder {
    service_category: ServiceCategory,
    rate_category: String,
    rate_name: String,
    from_location: PortCode,
    to_location: Option<PortCode>,
    base_rate: Rate,
    currency: Currency,
    unit: Option<String>,
    valid_from: NaiveDate,
    valid_to: Option<NaiveDate>,
    active: bool,
}

impl RateTableEntryBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(
        service_category: ServiceCategory,
        rate_category: impl Into<String>,
        rate_name: impl Into<String>,
        from_location: PortCode,
        base_rate: Rate,
        valid_from: NaiveDate,
    ) -> Self {
        Self {
            service_category,
            rate_category: rate_category.into().trim().to_ascii_uppercase(),
            rate_name: rate_name.into(),
            from_location,
            to_location: None,
            base_rate,
            currency: Currency::usd(),
            unit: None,
            valid_from,
            valid_to: None,
            active: true,
        }
    }

    /// Scopes the entry to an explicit destination.
    #[must_use]
    pub fn to_location(mut self, to: PortCode) -> Self {
        self.to_location = Some(to);
        self
    }

    /// Sets the currency.
    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Sets the unit description.
    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Closes the validity window.
    #[must_use]
    pub fn valid_to(mut self, end: NaiveDate) -> Self {
        self.valid_to = Some(end);
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Builds the entry with validation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` for a blank rate category
    /// or name and `DomainError::InvalidValidityWindow` when `valid_to`
    /// precedes `valid_from`.
    pub fn try_build(self) -> DomainResult<RateTableEntry> {
        if self.rate_category.is_empty() {
            return Err(DomainError::ValidationError(
                "rate category cannot be empty".to_string(),
            ));
        }
        if self.rate_name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "rate name cannot be empty".to_string(),
            ));
        }
        if let Some(end) = self.valid_to
            && end < self.valid_from
        {
            return Err(DomainError::InvalidValidityWindow(format!(
                "valid_to {end} precedes valid_from {}",
                self.valid_from
            )));
        }

        Ok(RateTableEntry {
            id: RateEntryId::new_v4(),
            service_category: self.service_category,
            rate_category: self.rate_category,
            rate_name: self.rate_name,
            from_location: self.from_location,
            to_location: self.to_location,
            base_rate: self.base_rate,
            currency: self.currency,
            unit: self.unit,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            active: self.active,
            created_at: Timestamp::now(),
            updated_at: None,
        })
    }
}
