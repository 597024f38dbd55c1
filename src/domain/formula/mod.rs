//! # Fee Formulas
//!
//! Typed fee-formula configuration.
//!
//! Administrators author pricing formulas as one of a closed set of
//! shapes ([`Formula`]), each with a typed payload validated at load
//! time. Applicability predicates ([`Condition`], [`ConditionSet`]) and
//! free-form arithmetic expressions ([`Expr`]) share the same module.
//!
//! Evaluation lives in
//! [`FormulaEvaluator`](crate::domain::services::formula_evaluator::FormulaEvaluator).

pub mod condition;
pub mod definition;
pub mod expression;

pub use condition::{Condition, ConditionSet};
pub use definition::{ConditionalBranch, Formula, FormulaKind, TierBand};
pub use expression::{BinaryOp, Expr};
