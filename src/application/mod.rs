//! # Application Layer
//!
//! Use-case orchestration over the domain layer.
//!
//! This layer contains:
//! - **Services**: Calculation engine, quotation and estimate workflows
//! - **DTOs**: Role-partitioned quotation projections
//! - **Errors**: Application-level error types

pub mod dto;
pub mod error;
pub mod services;
