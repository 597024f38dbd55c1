//! # Domain Enums
//!
//! Enumeration types for domain concepts.
//!
//! This module provides the core domain enumerations of the quotation
//! platform:
//!
//! - [`ServiceCategory`] - The maritime service lines that can be quoted
//! - [`ChargeClass`] - Classification of a fee into base, surcharge or discount
//! - [`RuleStatus`] - Fee-rule lifecycle status
//! - [`CallerRole`] - The caller's role, used only to select a projection
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, `FromStr`, and Serde traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing an enum from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEnumError {
    /// The provided string value is not valid for the enum.
    #[error("invalid {0} value: {1}")]
    InvalidValue(&'static str, String),
}

/// The maritime service lines customers can request quotations for.
///
/// # Examples
///
/// ```
/// use seaquote::domain::value_objects::enums::ServiceCategory;
///
/// let agency = ServiceCategory::ShippingAgency;
/// assert_eq!(agency.to_string(), "SHIPPING_AGENCY");
/// assert_eq!("freight_forwarding".parse::<ServiceCategory>().unwrap(),
///            ServiceCategory::FreightForwarding);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ServiceCategory {
    /// Port agency services for a vessel call.
    ShippingAgency = 0,
    /// Container freight forwarding.
    FreightForwarding = 1,
    /// Vessel chartering and broking.
    Chartering = 2,
    /// Door-to-door total logistics.
    TotalLogistics = 3,
}

impl ServiceCategory {
    /// All categories, in stable order.
    pub const ALL: [Self; 4] = [
        Self::ShippingAgency,
        Self::FreightForwarding,
        Self::Chartering,
        Self::TotalLogistics,
    ];
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShippingAgency => write!(f, "SHIPPING_AGENCY"),
            Self::FreightForwarding => write!(f, "FREIGHT_FORWARDING"),
            Self::Chartering => write!(f, "CHARTERING"),
            Self::TotalLogistics => write!(f, "TOTAL_LOGISTICS"),
        }
    }
}

impl FromStr for ServiceCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "SHIPPING_AGENCY" | "SHIPPINGAGENCY" => Ok(Self::ShippingAgency),
            "FREIGHT_FORWARDING" | "FREIGHTFORWARDING" => Ok(Self::FreightForwarding),
            "CHARTERING" => Ok(Self::Chartering),
            "TOTAL_LOGISTICS" | "TOTALLOGISTICS" => Ok(Self::TotalLogistics),
            _ => Err(ParseEnumError::InvalidValue("ServiceCategory", s.to_string())),
        }
    }
}

/// Classification of a fee rule's contribution to the quotation totals.
///
/// Drives how a calculation step's amount is aggregated: base prices and
/// surcharges add to the subtotal, discounts subtract from it.
///
/// # Examples
///
/// ```
/// use seaquote::domain::value_objects::enums::ChargeClass;
///
/// assert!(ChargeClass::Discount.is_deduction());
/// assert!(!ChargeClass::Surcharge.is_deduction());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ChargeClass {
    /// Contributes to the base price.
    BasePrice = 0,
    /// Added on top of the base price.
    Surcharge = 1,
    /// Subtracted from the subtotal.
    Discount = 2,
}

impl ChargeClass {
    /// Returns true if amounts of this class reduce the subtotal.
    #[inline]
    #[must_use]
    pub const fn is_deduction(self) -> bool {
        matches!(self, Self::Discount)
    }
}

impl fmt::Display for ChargeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BasePrice => write!(f, "BASE_PRICE"),
            Self::Surcharge => write!(f, "SURCHARGE"),
            Self::Discount => write!(f, "DISCOUNT"),
        }
    }
}

impl FromStr for ChargeClass {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "BASE_PRICE" | "BASEPRICE" | "BASE" => Ok(Self::BasePrice),
            "SURCHARGE" => Ok(Self::Surcharge),
            "DISCOUNT" => Ok(Self::Discount),
            _ => Err(ParseEnumError::InvalidValue("ChargeClass", s.to_string())),
        }
    }
}

/// Lifecycle status of a fee rule.
///
/// Only [`Active`](RuleStatus::Active) rules participate in pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum RuleStatus {
    /// Rule participates in pricing.
    #[default]
    Active = 0,
    /// Rule is temporarily disabled.
    Inactive = 1,
    /// Rule is retired and kept for audit only.
    Archived = 2,
}

impl RuleStatus {
    /// Returns true if the rule participates in pricing.
    #[inline]
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
            Self::Archived => write!(f, "ARCHIVED"),
        }
    }
}

impl FromStr for RuleStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            "ARCHIVED" => Ok(Self::Archived),
            _ => Err(ParseEnumError::InvalidValue("RuleStatus", s.to_string())),
        }
    }
}

/// The caller's role at the read boundary.
///
/// Used only to select which quotation projection is returned; the
/// engine itself performs no authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum CallerRole {
    /// Internal staff: receives the full breakdown.
    Staff = 0,
    /// Authenticated customer: receives the sanitized view.
    Customer = 1,
    /// Unauthenticated guest: estimates only.
    Guest = 2,
}

impl CallerRole {
    /// Returns true if the caller may see the internal breakdown.
    #[inline]
    #[must_use]
    pub const fn can_view_breakdown(self) -> bool {
        matches!(self, Self::Staff)
    }
}

impl fmt::Display for CallerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staff => write!(f, "STAFF"),
            Self::Customer => write!(f, "CUSTOMER"),
            Self::Guest => write!(f, "GUEST"),
        }
    }
}

impl FromStr for CallerRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STAFF" | "EMPLOYEE" | "ADMIN" => Ok(Self::Staff),
            "CUSTOMER" => Ok(Self::Customer),
            "GUEST" => Ok(Self::Guest),
            _ => Err(ParseEnumError::InvalidValue("CallerRole", s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod service_category {
        use super::*;

        #[test]
        fn display_and_parse_roundtrip() {
            for category in ServiceCategory::ALL {
                let parsed: ServiceCategory = category.to_string().parse().unwrap();
                assert_eq!(parsed, category);
            }
        }

        #[test]
        fn parse_accepts_hyphens_and_case() {
            assert_eq!(
                "shipping-agency".parse::<ServiceCategory>().unwrap(),
                ServiceCategory::ShippingAgency
            );
        }

        #[test]
        fn parse_rejects_unknown() {
            assert!("TOWAGE".parse::<ServiceCategory>().is_err());
        }

        #[test]
        fn serde_uses_screaming_snake_case() {
            let json = serde_json::to_string(&ServiceCategory::TotalLogistics).unwrap();
            assert_eq!(json, "\"TOTAL_LOGISTICS\"");
        }
    }

    mod charge_class {
        use super::*;

        #[test]
        fn only_discount_is_deduction() {
            assert!(ChargeClass::Discount.is_deduction());
            assert!(!ChargeClass::BasePrice.is_deduction());
            assert!(!ChargeClass::Surcharge.is_deduction());
        }

        #[test]
        fn parse_accepts_base_alias() {
            assert_eq!("BASE".parse::<ChargeClass>().unwrap(), ChargeClass::BasePrice);
        }
    }

    mod rule_status {
        use super::*;

        #[test]
        fn default_is_active() {
            assert_eq!(RuleStatus::default(), RuleStatus::Active);
            assert!(RuleStatus::Active.is_active());
        }

        #[test]
        fn inactive_and_archived_are_not_active() {
            assert!(!RuleStatus::Inactive.is_active());
            assert!(!RuleStatus::Archived.is_active());
        }
    }

    mod caller_role {
        use super::*;

        #[test]
        fn only_staff_sees_breakdown() {
            assert!(CallerRole::Staff.can_view_breakdown());
            assert!(!CallerRole::Customer.can_view_breakdown());
            assert!(!CallerRole::Guest.can_view_breakdown());
        }

        #[test]
        fn parse_accepts_employee_alias() {
            assert_eq!("employee".parse::<CallerRole>().unwrap(), CallerRole::Staff);
        }
    }
}
