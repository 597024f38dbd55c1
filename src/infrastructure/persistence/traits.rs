//! # Repository Traits
//!
//! Port definitions for persistence abstraction.
//!
//! This module defines the repository traits (ports) that abstract
//! persistence operations. Implementations can use different backends;
//! the crate ships thread-safe in-memory implementations used by the
//! tests and the default binary wiring.
//!
//! # Available Repositories
//!
//! - [`FeeRuleRepository`]: Persistence for fee rules
//! - [`RateTableRepository`]: Persistence for rate table entries
//! - [`QuotationRepository`]: Versioned persistence for quotations
//! - [`SavedEstimateRepository`]: Persistence and expiry scan for estimates

use crate::domain::entities::fee_rule::FeeRule;
use crate::domain::entities::quotation::Quotation;
use crate::domain::entities::rate_entry::RateTableEntry;
use crate::domain::entities::saved_estimate::SavedEstimate;
use crate::domain::value_objects::{
    CustomerId, EstimateCode, FeeRuleId, QuotationId, RateEntryId, RuleCode, ServiceCategory,
    Timestamp,
};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Duplicate entity.
    #[error("{entity_type} already exists: {id}")]
    Duplicate {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Optimistic locking conflict.
    #[error("version conflict on {entity_type} {id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
        /// Expected version.
        expected: u64,
        /// Actual version.
        actual: u64,
    },

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a version conflict error.
    #[must_use]
    pub fn version_conflict(
        entity_type: &'static str,
        id: impl Into<String>,
        expected: u64,
        actual: u64,
    ) -> Self {
        Self::VersionConflict {
            entity_type,
            id: id.into(),
            expected,
            actual,
        }
    }

    /// Returns true if this is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a duplicate error.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// Returns true if this is a version conflict.
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository for fee rules.
///
/// Enforces the `code` uniqueness invariant on save.
#[async_trait]
pub trait FeeRuleRepository: Send + Sync + fmt::Debug {
    /// Saves a rule, inserting or updating by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` when a different rule
    /// already holds the same code.
    async fn save(&self, rule: &FeeRule) -> RepositoryResult<()>;

    /// Gets a rule by ID. Returns `None` if absent.
    async fn get(&self, id: &FeeRuleId) -> RepositoryResult<Option<FeeRule>>;

    /// Finds a rule by its unique code.
    async fn find_by_code(&self, code: &RuleCode) -> RepositoryResult<Option<FeeRule>>;

    /// Finds the active rules of one service category.
    ///
    /// The orchestrator snapshots this result once per calculation.
    async fn find_active_by_category(
        &self,
        category: ServiceCategory,
    ) -> RepositoryResult<Vec<FeeRule>>;

    /// Returns all rules.
    async fn find_all(&self) -> RepositoryResult<Vec<FeeRule>>;

    /// Returns the highest display order within a category, for
    /// append-at-end defaulting.
    async fn max_display_order(&self, category: ServiceCategory) -> RepositoryResult<i32>;

    /// Deletes a rule by ID. Returns whether it existed.
    async fn delete(&self, id: &FeeRuleId) -> RepositoryResult<bool>;
}

/// Repository for rate table entries.
#[async_trait]
pub trait RateTableRepository: Send + Sync + fmt::Debug {
    /// Saves an entry, inserting or updating by id.
    async fn save(&self, entry: &RateTableEntry) -> RepositoryResult<()>;

    /// Gets an entry by ID. Returns `None` if absent.
    async fn get(&self, id: &RateEntryId) -> RepositoryResult<Option<RateTableEntry>>;

    /// Returns all active entries.
    ///
    /// The orchestrator snapshots this result once per calculation.
    async fn find_active(&self) -> RepositoryResult<Vec<RateTableEntry>>;

    /// Returns all entries of one service category.
    async fn find_by_category(
        &self,
        category: ServiceCategory,
    ) -> RepositoryResult<Vec<RateTableEntry>>;

    /// Deletes an entry by ID. Returns whether it existed.
    async fn delete(&self, id: &RateEntryId) -> RepositoryResult<bool>;
}

/// Versioned repository for quotations.
///
/// Quotation mutation is serialized per id through an optimistic
/// version check: conflicting concurrent writers fail one side with a
/// retryable conflict rather than silently overwriting.
#[async_trait]
pub trait QuotationRepository: Send + Sync + fmt::Debug {
    /// Inserts a new quotation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the id already exists.
    async fn insert(&self, quotation: &Quotation) -> RepositoryResult<()>;

    /// Updates a quotation whose stored version equals
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::VersionConflict` when another writer
    /// got there first and `RepositoryError::NotFound` for an unknown
    /// id.
    async fn update(&self, quotation: &Quotation, expected_version: u64) -> RepositoryResult<()>;

    /// Gets a quotation by ID. Returns `None` if absent.
    async fn get(&self, id: &QuotationId) -> RepositoryResult<Option<Quotation>>;

    /// Returns all quotations of one customer.
    async fn find_by_customer(&self, customer: &CustomerId) -> RepositoryResult<Vec<Quotation>>;

    /// Counts all quotations (feeds the quote-code sequence).
    async fn count(&self) -> RepositoryResult<u64>;
}

/// Repository for saved estimates.
#[async_trait]
pub trait SavedEstimateRepository: Send + Sync + fmt::Debug {
    /// Saves an estimate, inserting or updating by id.
    async fn save(&self, estimate: &SavedEstimate) -> RepositoryResult<()>;

    /// Finds an estimate by its human-facing code.
    async fn find_by_code(&self, code: &EstimateCode) -> RepositoryResult<Option<SavedEstimate>>;

    /// Deletes expired, unconverted estimates created no later than
    /// `scan_started`. Returns the number deleted.
    ///
    /// Idempotent; converted estimates are never deleted regardless of
    /// expiry.
    async fn delete_sweepable(
        &self,
        now: Timestamp,
        scan_started: Timestamp,
    ) -> RepositoryResult<u64>;

    /// Counts all estimates.
    async fn count(&self) -> RepositoryResult<u64>;
}
