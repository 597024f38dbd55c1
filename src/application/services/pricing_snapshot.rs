//! # Pricing Snapshot
//!
//! A consistent, point-in-time view of the pricing configuration.
//!
//! Every orchestration takes one [`PricingSnapshot`] at its start and
//! computes exclusively against it: an administrator's concurrent edit
//! can never cause one quotation to mix rules from two different
//! configurations, and concurrent calculations with different
//! snapshots cannot interfere.

use crate::domain::entities::fee_rule::FeeRule;
use crate::domain::entities::rate_entry::RateTableEntry;
use crate::domain::value_objects::Timestamp;

/// An immutable snapshot of fee rules and rate table entries.
#[derive(Debug, Clone)]
pub struct PricingSnapshot {
    fee_rules: Vec<FeeRule>,
    rate_entries: Vec<RateTableEntry>,
    taken_at: Timestamp,
}

impl PricingSnapshot {
    /// Creates a snapshot from already-loaded configuration.
    #[must_use]
    pub fn new(fee_rules: Vec<FeeRule>, rate_entries: Vec<RateTableEntry>) -> Self {
        Self {
            fee_rules,
            rate_entries,
            taken_at: Timestamp::now(),
        }
    }

    /// Returns the captured fee rules.
    #[inline]
    #[must_use]
    pub fn fee_rules(&self) -> &[FeeRule] {
        &self.fee_rules
    }

    /// Returns the captured rate table entries.
    #[inline]
    #[must_use]
    pub fn rate_entries(&self) -> &[RateTableEntry] {
        &self.rate_entries
    }

    /// Returns when the snapshot was taken.
    #[inline]
    #[must_use]
    pub fn taken_at(&self) -> Timestamp {
        self.taken_at
    }

    /// Returns true if the snapshot holds no fee rules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fee_rules.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::formula::Formula;
    use crate::domain::value_objects::{ChargeClass, ServiceCategory};
    use rust_decimal::Decimal;

    #[test]
    fn snapshot_captures_rules_and_timestamp() {
        let rule = FeeRule::builder(
            "Doc fee",
            "DOC_FEE",
            ServiceCategory::FreightForwarding,
            ChargeClass::BasePrice,
            Formula::Fixed {
                amount: Decimal::new(230, 0),
            },
        )
        .try_build(16)
        .unwrap();

        let snapshot = PricingSnapshot::new(vec![rule], Vec::new());
        assert_eq!(snapshot.fee_rules().len(), 1);
        assert!(snapshot.rate_entries().is_empty());
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn empty_snapshot_reports_empty() {
        assert!(PricingSnapshot::new(Vec::new(), Vec::new()).is_empty());
    }
}
