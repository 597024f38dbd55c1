//! # Application Errors
//!
//! Error types for the application layer.
//!
//! These errors represent failures that can occur during workflow
//! execution, including validation failures, business rule violations,
//! and infrastructure errors.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Domain(DomainError)                 - Business rule violations
//! ├── Infrastructure(InfrastructureError) - External system failures
//! ├── Validation(String)                  - Input validation failures
//! ├── NotFound { resource, id }           - Resource not found
//! ├── Conflict(String)                    - Retryable concurrent modification
//! └── Unauthorized                        - Caller may not see this projection
//! ```
//!
//! # Examples
//!
//! ```
//! use seaquote::application::error::ApplicationError;
//!
//! let err = ApplicationError::not_found("Quotation", "QT-20240815-0001");
//! assert!(!err.is_retryable());
//!
//! let conflict = ApplicationError::conflict("version mismatch");
//! assert!(conflict.is_retryable());
//! ```

use crate::domain::errors::DomainError;
use crate::infrastructure::persistence::RepositoryError;
use thiserror::Error;

/// Infrastructure layer error.
///
/// Represents errors from external systems and infrastructure
/// components such as databases and configuration sources.
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// Database error.
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl InfrastructureError {
    /// Creates a database error.
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

/// Application layer error.
///
/// The top-level error surfaced by application workflows to the API
/// boundary.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Business rule violation from the domain layer.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Infrastructure failure.
    #[error("infrastructure error: {0}")]
    Infrastructure(#[from] InfrastructureError),

    /// Input validation failure.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// The resource type.
        resource: &'static str,
        /// The identifier looked up.
        id: String,
    },

    /// Concurrent modification conflict; the caller may retry.
    #[error("concurrent modification conflict: {0}")]
    Conflict(String),

    /// The caller's role does not permit this projection or operation.
    #[error("unauthorized")]
    Unauthorized,
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Creates a retryable conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Returns true if retrying the operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns true if the error is a user-visible "no pricing
    /// available" condition.
    #[must_use]
    pub const fn is_no_pricing(&self) -> bool {
        matches!(self, Self::Domain(DomainError::NoApplicableRules(_)))
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity_type, id } => Self::NotFound {
                resource: entity_type,
                id,
            },
            RepositoryError::VersionConflict { .. } => Self::Conflict(err.to_string()),
            other => Self::Infrastructure(InfrastructureError::Repository(other)),
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_retryable() {
        assert!(ApplicationError::conflict("try again").is_retryable());
        assert!(!ApplicationError::validation("bad input").is_retryable());
        assert!(!ApplicationError::Unauthorized.is_retryable());
    }

    #[test]
    fn repository_not_found_maps_to_not_found() {
        let err = RepositoryError::not_found("Quotation", "abc");
        let app: ApplicationError = err.into();
        assert!(matches!(app, ApplicationError::NotFound { .. }));
    }

    #[test]
    fn repository_version_conflict_maps_to_retryable_conflict() {
        let err = RepositoryError::version_conflict("Quotation", "abc", 3, 4);
        let app: ApplicationError = err.into();
        assert!(app.is_retryable());
    }

    #[test]
    fn no_applicable_rules_is_user_visible() {
        let app: ApplicationError =
            DomainError::NoApplicableRules("CHARTERING".to_string()).into();
        assert!(app.is_no_pricing());
    }

    #[test]
    fn display_includes_context() {
        let err = ApplicationError::not_found("Quotation", "QT-1");
        assert_eq!(err.to_string(), "Quotation not found: QT-1");
    }
}
