//! # Application DTOs
//!
//! Read projections crossing the application boundary.
//!
//! The quotation views enforce the confidentiality partition: the
//! internal view carries the full breakdown and margin for staff, the
//! external view carries only the final payable amount for customers.

pub mod quotation_views;

pub use quotation_views::{
    CalculationStepView, QuotationExternalView, QuotationInternalView, QuotationView,
    external_view, internal_view, view_for_role,
};
