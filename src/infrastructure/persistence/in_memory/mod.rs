//! # In-Memory Repositories
//!
//! Thread-safe in-memory implementations of the persistence ports.
//!
//! These back the unit tests and the default binary wiring without a
//! database dependency; the quotation repository performs the same
//! optimistic version check a database-backed implementation would.

pub mod estimate_repository;
pub mod fee_rule_repository;
pub mod quotation_repository;
pub mod rate_table_repository;

pub use estimate_repository::InMemorySavedEstimateRepository;
pub use fee_rule_repository::InMemoryFeeRuleRepository;
pub use quotation_repository::InMemoryQuotationRepository;
pub use rate_table_repository::InMemoryRateTableRepository;
