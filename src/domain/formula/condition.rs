//! # Condition Predicates
//!
//! Threshold and range predicates over named inputs.
//!
//! Administrators constrain fee rules ("only applies when DWT is within
//! a band") and conditional-formula branches with [`Condition`] values:
//! an inclusive min/max window on one named input. A [`ConditionSet`]
//! combines several conditions conjunctively.
//!
//! A condition on an input the request did not supply evaluates to
//! false: the rule simply does not apply.
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::formula::condition::{Condition, ConditionSet};
//! use seaquote::domain::value_objects::ServiceInputs;
//! use rust_decimal::Decimal;
//!
//! let set = ConditionSet::new(vec![
//!     Condition::at_least("dwt", Decimal::new(10_000, 0)).unwrap(),
//!     Condition::at_most("dwt", Decimal::new(50_000, 0)).unwrap(),
//! ]);
//!
//! let inputs = ServiceInputs::new().with("dwt", Decimal::new(30_000, 0));
//! assert!(set.matches(&inputs));
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::ServiceInputs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive min/max window on one named input.
///
/// At least one bound must be present; when both are present,
/// `min <= max` must hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<Decimal>,
}

impl Condition {
    /// Creates a condition with explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormula` if the input name is blank,
    /// both bounds are absent, or `min > max`.
    pub fn new(input: &str, min: Option<Decimal>, max: Option<Decimal>) -> DomainResult<Self> {
        let input = input.trim().to_ascii_lowercase();
        if input.is_empty() {
            return Err(DomainError::InvalidFormula(
                "condition input name cannot be empty".to_string(),
            ));
        }
        if min.is_none() && max.is_none() {
            return Err(DomainError::InvalidFormula(format!(
                "condition on '{input}' needs at least one bound"
            )));
        }
        if let (Some(lo), Some(hi)) = (min, max)
            && lo > hi
        {
            return Err(DomainError::InvalidFormula(format!(
                "condition on '{input}' has min {lo} above max {hi}"
            )));
        }
        Ok(Self { input, min, max })
    }

    /// Creates a lower-bound-only condition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormula` if the input name is blank.
    pub fn at_least(input: &str, min: Decimal) -> DomainResult<Self> {
        Self::new(input, Some(min), None)
    }

    /// Creates an upper-bound-only condition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormula` if the input name is blank.
    pub fn at_most(input: &str, max: Decimal) -> DomainResult<Self> {
        Self::new(input, None, Some(max))
    }

    /// Returns the constrained input name.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the inclusive lower bound, if any.
    #[must_use]
    pub const fn min(&self) -> Option<Decimal> {
        self.min
    }

    /// Returns the inclusive upper bound, if any.
    #[must_use]
    pub const fn max(&self) -> Option<Decimal> {
        self.max
    }

    /// Evaluates the condition against a request's inputs.
    ///
    /// A missing input evaluates to false.
    #[must_use]
    pub fn matches(&self, inputs: &ServiceInputs) -> bool {
        let Some(value) = inputs.get(&self.input) else {
            return false;
        };
        if let Some(min) = self.min
            && value < min
        {
            return false;
        }
        if let Some(max) = self.max
            && value > max
        {
            return false;
        }
        true
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => write!(f, "{lo} <= {} <= {hi}", self.input),
            (Some(lo), None) => write!(f, "{} >= {lo}", self.input),
            (None, Some(hi)) => write!(f, "{} <= {hi}", self.input),
            (None, None) => write!(f, "{}", self.input),
        }
    }
}

/// A conjunction of conditions.
///
/// Empty sets match every request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl ConditionSet {
    /// Creates a condition set from a list of conditions.
    #[must_use]
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// Returns true if every condition holds for the given inputs.
    #[must_use]
    pub fn matches(&self, inputs: &ServiceInputs) -> bool {
        self.conditions.iter().all(|c| c.matches(inputs))
    }

    /// Returns the conditions in declaration order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns true if the set contains no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for condition in &self.conditions {
            if !first {
                write!(f, " and ")?;
            }
            write!(f, "{condition}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn rejects_empty_input_name() {
            assert!(Condition::new("", Some(dec("1")), None).is_err());
        }

        #[test]
        fn rejects_unbounded() {
            assert!(Condition::new("dwt", None, None).is_err());
        }

        #[test]
        fn rejects_inverted_bounds() {
            assert!(Condition::new("dwt", Some(dec("10")), Some(dec("5"))).is_err());
        }

        #[test]
        fn normalizes_input_name() {
            let c = Condition::at_least(" DWT ", dec("1")).unwrap();
            assert_eq!(c.input(), "dwt");
        }
    }

    mod matching {
        use super::*;

        #[test]
        fn range_is_inclusive() {
            let c = Condition::new("dwt", Some(dec("10000")), Some(dec("50000"))).unwrap();
            assert!(c.matches(&ServiceInputs::new().with("dwt", dec("10000"))));
            assert!(c.matches(&ServiceInputs::new().with("dwt", dec("50000"))));
            assert!(!c.matches(&ServiceInputs::new().with("dwt", dec("50001"))));
            assert!(!c.matches(&ServiceInputs::new().with("dwt", dec("9999"))));
        }

        #[test]
        fn missing_input_fails_the_condition() {
            let c = Condition::at_least("dwt", dec("1")).unwrap();
            assert!(!c.matches(&ServiceInputs::new()));
        }

        #[test]
        fn set_requires_all_conditions() {
            let set = ConditionSet::new(vec![
                Condition::at_least("dwt", dec("10000")).unwrap(),
                Condition::at_most("loa", dec("200")).unwrap(),
            ]);
            let ok = ServiceInputs::new()
                .with("dwt", dec("20000"))
                .with("loa", dec("180"));
            let too_long = ServiceInputs::new()
                .with("dwt", dec("20000"))
                .with("loa", dec("250"));
            assert!(set.matches(&ok));
            assert!(!set.matches(&too_long));
        }

        #[test]
        fn empty_set_matches_everything() {
            assert!(ConditionSet::default().matches(&ServiceInputs::new()));
        }
    }

    mod display {
        use super::*;

        #[test]
        fn formats_bounds() {
            let c = Condition::new("dwt", Some(dec("1")), Some(dec("2"))).unwrap();
            assert_eq!(c.to_string(), "1 <= dwt <= 2");
            let lo = Condition::at_least("grt", dec("5")).unwrap();
            assert_eq!(lo.to_string(), "grt >= 5");
        }
    }

    mod serde_support {
        use super::*;

        #[test]
        fn roundtrip() {
            let set = ConditionSet::new(vec![
                Condition::new("dwt", Some(dec("10000")), Some(dec("50000"))).unwrap(),
            ]);
            let json = serde_json::to_string(&set).unwrap();
            let back: ConditionSet = serde_json::from_str(&json).unwrap();
            assert_eq!(set, back);
        }
    }
}
