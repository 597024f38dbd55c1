//! # Timestamp Value Object
//!
//! DateTime wrapper with domain-specific methods.
//!
//! This module provides the [`Timestamp`] type for representing points
//! in time, with helpers for the day-granular validity windows used by
//! quotations and saved estimates.
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::value_objects::timestamp::Timestamp;
//!
//! let now = Timestamp::now();
//! let next_week = now.add_days(7);
//!
//! assert!(next_week.is_after(&now));
//! assert!(!next_week.is_expired());
//! ```

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC timestamp.
///
/// Wraps `chrono::DateTime<Utc>` with domain-specific methods for
/// validity windows and expiry checks.
///
/// # Invariants
///
/// - Always in UTC
///
/// # Examples
///
/// ```
/// use seaquote::domain::value_objects::timestamp::Timestamp;
///
/// let ts = Timestamp::from_secs(1_704_067_200).unwrap();
/// assert_eq!(ts.date().to_string(), "2024-01-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Compact date format used in quote and estimate codes.
    pub const CODE_DATE_FORMAT: &'static str = "%Y%m%d";

    /// Creates a timestamp for the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from Unix seconds.
    ///
    /// Returns `None` if the value is out of range.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Returns the Unix timestamp in seconds.
    #[inline]
    #[must_use]
    pub fn timestamp_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Adds seconds to the timestamp.
    #[must_use]
    pub fn add_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// Subtracts seconds from the timestamp.
    #[must_use]
    pub fn sub_secs(&self, secs: i64) -> Self {
        Self(self.0 - Duration::seconds(secs))
    }

    /// Adds whole days to the timestamp.
    ///
    /// Used for quote validity windows and estimate time-to-live.
    ///
    /// # Examples
    ///
    /// ```
    /// use seaquote::domain::value_objects::timestamp::Timestamp;
    ///
    /// let ts = Timestamp::from_secs(0).unwrap();
    /// assert_eq!(ts.add_days(7).timestamp_secs(), 7 * 86_400);
    /// ```
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Returns the calendar date (UTC) of this timestamp.
    #[inline]
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Returns true if this timestamp is in the past.
    ///
    /// # Examples
    ///
    /// ```
    /// use seaquote::domain::value_objects::timestamp::Timestamp;
    ///
    /// assert!(Timestamp::from_secs(0).unwrap().is_expired());
    /// assert!(!Timestamp::now().add_days(1).is_expired());
    /// ```
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.0 < Utc::now()
    }

    /// Returns true if this timestamp is before another.
    #[inline]
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self.0 < other.0
    }

    /// Returns true if this timestamp is after another.
    #[inline]
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Formats the date portion for human-facing codes
    /// (`YYYYMMDD`).
    #[must_use]
    pub fn to_code_date(&self) -> String {
        self.0.format(Self::CODE_DATE_FORMAT).to_string()
    }

    /// Formats the timestamp as ISO 8601 / RFC 3339.
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Returns the underlying DateTime.
    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
