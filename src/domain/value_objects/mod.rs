//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`FeeRuleId`], [`RateEntryId`], [`QuotationId`], [`EstimateId`],
//!   [`RequestId`], [`CustomerId`], [`StaffId`]: UUID-based identifiers
//! - [`RuleCode`], [`PortCode`], [`EstimateCode`]: String-based identifiers
//!
//! ## Monetary Types
//!
//! - [`Money`]: Non-negative amount at 2 decimal places
//! - [`Rate`]: Non-negative coefficient at 6 decimal places
//! - [`Currency`]: 3-letter currency code
//!
//! ## Arithmetic
//!
//! - [`ArithmeticError`]: Error type for arithmetic failures
//! - [`CheckedArithmetic`]: Trait for safe arithmetic operations
//! - `round_money` / `round_rate`: The crate-wide rounding policy
//!
//! ## Domain Enums
//!
//! - `ServiceCategory`: The quoted maritime service lines
//! - `ChargeClass`: Base price, surcharge or discount
//! - `RuleStatus`: Fee-rule lifecycle
//! - `QuoteStatus`: Quotation lifecycle states
//! - `CallerRole`: Projection selector at the read boundary

pub mod arithmetic;
pub mod enums;
pub mod ids;
pub mod inputs;
pub mod money;
pub mod quote_status;
pub mod timestamp;

pub use arithmetic::{
    ArithmeticError, ArithmeticResult, CheckedArithmetic, round_money, round_rate,
};
pub use enums::{CallerRole, ChargeClass, RuleStatus, ServiceCategory};
pub use ids::{
    CustomerId, EstimateCode, EstimateId, FeeRuleId, PortCode, QuotationId, RateEntryId, RequestId,
    RuleCode, StaffId,
};
pub use inputs::ServiceInputs;
pub use money::{Currency, Money, Rate};
pub use quote_status::QuoteStatus;
pub use timestamp::Timestamp;
