//! # Identity Value Objects
//!
//! Type-safe identity wrappers for domain identifiers.
//!
//! This module provides newtype wrappers for all domain identifiers,
//! ensuring type safety and preventing accidental mixing of different
//! ID types.
//!
//! ## UUID-based Identifiers
//!
//! - [`FeeRuleId`] - Fee rule identifier
//! - [`RateEntryId`] - Rate table entry identifier
//! - [`QuotationId`] - Quotation identifier
//! - [`EstimateId`] - Saved estimate identifier
//! - [`RequestId`] - Service request identifier
//! - [`CustomerId`] - Customer identifier
//! - [`StaffId`] - Staff member identifier
//!
//! ## String-based Identifiers
//!
//! - [`RuleCode`] - Unique administrative fee-rule code
//! - [`PortCode`] - Port identifier (e.g. `HAIPHONG`)
//! - [`EstimateCode`] - Human-facing estimate code

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates an identifier from an existing UUID.
            #[inline]
            #[must_use]
            pub const fn new(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generates a new random identifier using UUID v4.
            #[must_use]
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the inner UUID value.
            #[inline]
            #[must_use]
            pub const fn get(self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl From<Uuid> for $name {
            #[inline]
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from a string, upper-casing it.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into().trim().to_ascii_uppercase())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

uuid_id! {
    /// Fee rule identifier.
    ///
    /// A UUID-based identifier uniquely identifying an
    /// administrator-authored fee rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use seaquote::domain::value_objects::ids::FeeRuleId;
    ///
    /// let id = FeeRuleId::new_v4();
    /// println!("rule: {}", id);
    /// ```
    FeeRuleId
}

uuid_id! {
    /// Rate table entry identifier.
    RateEntryId
}

uuid_id! {
    /// Quotation identifier.
    ///
    /// Identifies a priced quotation aggregate.
    QuotationId
}

uuid_id! {
    /// Saved estimate identifier.
    EstimateId
}

uuid_id! {
    /// Service request identifier.
    RequestId
}

uuid_id! {
    /// Customer identifier.
    CustomerId
}

uuid_id! {
    /// Staff member identifier.
    StaffId
}

string_id! {
    /// Unique administrative fee-rule code (e.g. `TONNAGE_FEE`).
    ///
    /// Codes are unique across all rules and provide the deterministic
    /// tie-break for rule ordering.
    RuleCode
}

string_id! {
    /// Port identifier (e.g. `HAIPHONG`).
    ///
    /// Port codes are matched case-insensitively by upper-casing on
    /// construction.
    PortCode
}

string_id! {
    /// Human-facing estimate code (e.g. `EST-20240815-1A2B3C`).
    EstimateCode
}
