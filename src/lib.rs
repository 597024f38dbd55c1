//! # Seaquote
//!
//! Service-quotation engine for a maritime logistics operator: fee-rule
//! evaluation, date-ranged rate resolution, deterministic quotation
//! assembly and a hard confidentiality partition between the staff and
//! customer views of a price.
//!
//! ## Architecture
//!
//! This crate follows Domain-Driven Design with a layered architecture:
//!
//! - **Domain Layer** (`domain`): Entities, value objects, the typed
//!   formula model and the pure pricing services
//! - **Application Layer** (`application`): Calculation orchestration,
//!   quotation/estimate workflows and role-partitioned projections
//! - **Infrastructure Layer** (`infrastructure`): Repository ports and
//!   in-memory implementations
//! - **API Layer** (`api`): REST interface
//!
//! ## Example
//!
//! ```
//! use seaquote::application::services::calculation::{CalculationEngine, CalculationRequest};
//! use seaquote::application::services::pricing_snapshot::PricingSnapshot;
//! use seaquote::domain::entities::fee_rule::FeeRule;
//! use seaquote::domain::formula::Formula;
//! use seaquote::domain::value_objects::{ChargeClass, ServiceCategory, ServiceInputs};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let rule = FeeRule::builder(
//!     "Agency Fee",
//!     "AGENCY_FEE",
//!     ServiceCategory::ShippingAgency,
//!     ChargeClass::BasePrice,
//!     Formula::BasePlusVariable {
//!         base: Decimal::new(400, 0),
//!         rate: Decimal::new(15, 2),
//!         variable: "grt".to_string(),
//!     },
//! )
//! .try_build(16)
//! .unwrap();
//!
//! let snapshot = PricingSnapshot::new(vec![rule], Vec::new());
//! let request = CalculationRequest {
//!     service_category: ServiceCategory::ShippingAgency,
//!     port: None,
//!     destination: None,
//!     as_of: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
//!     inputs: ServiceInputs::new().with("grt", Decimal::new(20_000, 0)),
//! };
//!
//! let draft = CalculationEngine::default().calculate(&request, &snapshot).unwrap();
//! assert_eq!(draft.totals.final_amount.to_string(), "3400.00");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
