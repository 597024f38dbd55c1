//! # Rate Resolver
//!
//! Date-ranged rate resolution with wildcard fallback.
//!
//! Given a service category, rate category, route and an as-of date,
//! the resolver finds the single applicable [`RateTableEntry`]: an
//! explicit-destination entry is preferred over a wildcard, and among
//! remaining candidates the most recent `valid_from` wins. Resolution
//! is a pure function over the snapshot it is handed.
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::services::rate_resolver::{RateQuery, RateResolver};
//! use seaquote::domain::entities::rate_entry::RateTableEntry;
//! use seaquote::domain::value_objects::{PortCode, Rate, ServiceCategory};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let entry = RateTableEntry::builder(
//!     ServiceCategory::ShippingAgency,
//!     "PILOTAGE",
//!     "Pilotage base",
//!     PortCode::new("HAIPHONG"),
//!     Rate::new(Decimal::new(300, 0)).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//! )
//! .try_build()
//! .unwrap();
//!
//! let query = RateQuery {
//!     service_category: ServiceCategory::ShippingAgency,
//!     rate_category: "PILOTAGE",
//!     from: &PortCode::new("HAIPHONG"),
//!     to: None,
//!     as_of: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
//! };
//!
//! let resolved = RateResolver::resolve(std::slice::from_ref(&entry), &query).unwrap();
//! assert_eq!(resolved.id(), entry.id());
//! ```

use crate::domain::entities::rate_entry::RateTableEntry;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{PortCode, ServiceCategory};
use chrono::NaiveDate;

/// One rate lookup.
#[derive(Debug, Clone, Copy)]
pub struct RateQuery<'a> {
    /// The service category the rate belongs to.
    pub service_category: ServiceCategory,
    /// The rate sub-classification (e.g. `PILOTAGE`, `BERTH`).
    pub rate_category: &'a str,
    /// Route origin; must match exactly.
    pub from: &'a PortCode,
    /// Route destination; `None` restricts to wildcard entries.
    pub to: Option<&'a PortCode>,
    /// The point in time the rate must be valid at.
    pub as_of: NaiveDate,
}

/// Resolves rate lookups against a snapshot of rate table entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateResolver;

impl RateResolver {
    /// Finds the single applicable entry for a query.
    ///
    /// Candidates must match the service and rate category, match the
    /// origin exactly, match the destination exactly or be a wildcard,
    /// be active, and contain `as_of` in their validity window. An
    /// explicit-destination match beats a wildcard; remaining ties go
    /// to the most recent `valid_from`, then the lowest entry id for
    /// full determinism over inconsistent source data.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RateNotFound` when no entry qualifies.
    pub fn resolve<'a>(
        entries: &'a [RateTableEntry],
        query: &RateQuery<'_>,
    ) -> DomainResult<&'a RateTableEntry> {
        let rate_category = query.rate_category.trim().to_ascii_uppercase();

        let mut candidates: Vec<&RateTableEntry> = entries
            .iter()
            .filter(|e| e.is_active())
            .filter(|e| e.service_category() == query.service_category)
            .filter(|e| e.rate_category() == rate_category)
            .filter(|e| e.matches_route(query.from, query.to))
            .filter(|e| e.is_in_window(query.as_of))
            .collect();

        candidates.sort_by(|a, b| {
            b.has_explicit_destination()
                .cmp(&a.has_explicit_destination())
                .then_with(|| b.valid_from().cmp(&a.valid_from()))
                .then_with(|| a.id().cmp(&b.id()))
        });

        candidates.first().copied().ok_or_else(|| {
            DomainError::RateNotFound(format!(
                "{}/{} from {} as of {}",
                query.service_category, rate_category, query.from, query.as_of
            ))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Rate;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rate(s: &str) -> Rate {
        Rate::new(s.parse::<Decimal>().unwrap()).unwrap()
    }

    fn ocean_entry(
        name: &str,
        to: Option<&str>,
        valid_from: NaiveDate,
        valid_to: Option<NaiveDate>,
    ) -> RateTableEntry {
        let mut builder = RateTableEntry::builder(
            ServiceCategory::FreightForwarding,
            "OCEAN_FREIGHT",
            name,
            PortCode::new("HAIPHONG"),
            rate("300"),
            valid_from,
        );
        if let Some(to) = to {
            builder = builder.to_location(PortCode::new(to));
        }
        if let Some(end) = valid_to {
            builder = builder.valid_to(end);
        }
        builder.try_build().unwrap()
    }

    fn query<'a>(to: Option<&'a PortCode>, as_of: NaiveDate) -> RateQuery<'a> {
        RateQuery {
            service_category: ServiceCategory::FreightForwarding,
            rate_category: "ocean_freight",
            from: &HAIPHONG,
            to,
            as_of,
        }
    }

    static HAIPHONG: std::sync::LazyLock<PortCode> =
        std::sync::LazyLock::new(|| PortCode::new("HAIPHONG"));

    #[test]
    fn explicit_destination_beats_wildcard() {
        let singapore = PortCode::new("SINGAPORE");
        let entries = vec![
            ocean_entry("wildcard", None, date(2024, 1, 1), None),
            ocean_entry("explicit", Some("SINGAPORE"), date(2024, 1, 1), None),
        ];
        let resolved =
            RateResolver::resolve(&entries, &query(Some(&singapore), date(2024, 8, 15))).unwrap();
        assert_eq!(resolved.rate_name(), "explicit");
    }

    #[test]
    fn most_recent_valid_from_wins_among_equals() {
        let entries = vec![
            ocean_entry("h1", None, date(2024, 1, 1), Some(date(2024, 6, 30))),
            ocean_entry("h2", None, date(2024, 7, 1), None),
        ];
        let resolved = RateResolver::resolve(&entries, &query(None, date(2024, 8, 15))).unwrap();
        assert_eq!(resolved.rate_name(), "h2");
    }

    #[test]
    fn overlapping_windows_pick_most_recent_start() {
        let entries = vec![
            ocean_entry("old", None, date(2024, 1, 1), None),
            ocean_entry("new", None, date(2024, 6, 1), None),
        ];
        let resolved = RateResolver::resolve(&entries, &query(None, date(2024, 8, 15))).unwrap();
        assert_eq!(resolved.rate_name(), "new");
    }

    #[test]
    fn out_of_window_entries_are_ignored() {
        let entries = vec![ocean_entry(
            "h1",
            None,
            date(2024, 1, 1),
            Some(date(2024, 6, 30)),
        )];
        let result = RateResolver::resolve(&entries, &query(None, date(2024, 8, 15)));
        assert!(matches!(result, Err(DomainError::RateNotFound(_))));
    }

    #[test]
    fn inactive_entries_are_ignored() {
        let mut entry = ocean_entry("h1", None, date(2024, 1, 1), None);
        entry.deactivate();
        let entries = vec![entry];
        let result = RateResolver::resolve(&entries, &query(None, date(2024, 8, 15)));
        assert!(matches!(result, Err(DomainError::RateNotFound(_))));
    }

    #[test]
    fn destination_scoped_entry_does_not_serve_unscoped_query() {
        let entries = vec![ocean_entry(
            "explicit",
            Some("SINGAPORE"),
            date(2024, 1, 1),
            None,
        )];
        let result = RateResolver::resolve(&entries, &query(None, date(2024, 8, 15)));
        assert!(matches!(result, Err(DomainError::RateNotFound(_))));
    }

    #[test]
    fn category_match_is_case_insensitive() {
        let entries = vec![ocean_entry("h1", None, date(2024, 1, 1), None)];
        let q = RateQuery {
            service_category: ServiceCategory::FreightForwarding,
            rate_category: " Ocean_Freight ",
            from: &HAIPHONG,
            to: None,
            as_of: date(2024, 8, 15),
        };
        assert!(RateResolver::resolve(&entries, &q).is_ok());
    }

    #[test]
    fn wrong_service_category_is_not_found() {
        let entries = vec![ocean_entry("h1", None, date(2024, 1, 1), None)];
        let q = RateQuery {
            service_category: ServiceCategory::Chartering,
            rate_category: "OCEAN_FREIGHT",
            from: &HAIPHONG,
            to: None,
            as_of: date(2024, 8, 15),
        };
        assert!(RateResolver::resolve(&entries, &q).is_err());
    }
}
