//! # Domain Entities
//!
//! Aggregate roots and entities representing core business concepts.
//!
//! ## Aggregates
//!
//! - [`Quotation`]: Priced quotation with state machine and audit trail
//!
//! ## Entities
//!
//! - [`FeeRule`]: Administrator-authored pricing rule
//! - [`RateTableEntry`]: Time-bounded, route-scoped base rate
//! - [`CalculationStep`]: One audited rule application (immutable)
//! - [`SavedEstimate`]: Ephemeral guest estimate with expiry

pub mod calculation_step;
pub mod fee_rule;
pub mod quotation;
pub mod rate_entry;
pub mod saved_estimate;

pub use calculation_step::{CalculationStep, StepOutcome};
pub use fee_rule::{FeeRule, FeeRuleBuilder};
pub use quotation::{Quotation, QuotationTotals};
pub use rate_entry::{RateTableEntry, RateTableEntryBuilder};
pub use saved_estimate::SavedEstimate;
