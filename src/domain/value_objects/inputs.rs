//! # Service Inputs
//!
//! The named numeric inputs a customer supplies with a service request.
//!
//! [`ServiceInputs`] is the bag of values (GRT, DWT, container counts,
//! stay days, ...) that fee formulas draw from. It is backed by a
//! `BTreeMap` so iteration order — and therefore every derived artifact
//! such as the calculation trace — is deterministic. Input names are
//! normalized to lower case on insertion and lookup, so `GRT` and `grt`
//! refer to the same value.
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::value_objects::inputs::ServiceInputs;
//! use rust_decimal::Decimal;
//!
//! let inputs = ServiceInputs::new()
//!     .with("GRT", Decimal::new(20_000, 0))
//!     .with("days", Decimal::new(3, 0));
//!
//! assert_eq!(inputs.get("grt"), Some(Decimal::new(20_000, 0)));
//! assert_eq!(inputs.len(), 2);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named numeric inputs for a service request.
///
/// # Invariants
///
/// - Names are non-empty and lower-case
/// - Iteration order is lexicographic (deterministic)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceInputs {
    values: BTreeMap<String, Decimal>,
}

impl ServiceInputs {
    /// Creates an empty input bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an input bag from an iterator of name/value pairs.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        let mut inputs = Self::new();
        for (name, value) in pairs {
            inputs.insert(name.as_ref(), value);
        }
        inputs
    }

    /// Inserts a value, replacing any previous value under the same name.
    pub fn insert(&mut self, name: &str, value: Decimal) {
        let key = Self::normalize(name);
        if !key.is_empty() {
            self.values.insert(key, value);
        }
    }

    /// Builder-style insertion.
    #[must_use]
    pub fn with(mut self, name: &str, value: Decimal) -> Self {
        self.insert(name, value);
        self
    }

    /// Looks up a value by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.values.get(&Self::normalize(name)).copied()
    }

    /// Returns true if a value exists under the given name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&Self::normalize(name))
    }

    /// Returns the number of inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over name/value pairs in lexicographic name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    fn normalize(name: &str) -> String {
        name.trim().to_ascii_lowercase()
    }
}

impl fmt::Display for ServiceInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}
