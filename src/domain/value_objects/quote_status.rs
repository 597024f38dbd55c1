//! # Quotation Status
//!
//! Quotation lifecycle state machine.
//!
//! This module provides the [`QuoteStatus`] enum representing the
//! lifecycle of a quotation with enforced state transitions.
//!
//! # State Machine
//!
//! ```text
//! Draft → Sent → Accepted
//!           ├──→ Rejected
//!           └──→ Expired   (validity window elapsed)
//! ```
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::value_objects::quote_status::QuoteStatus;
//!
//! let status = QuoteStatus::Draft;
//! assert!(status.can_transition_to(QuoteStatus::Sent));
//! assert!(!status.can_transition_to(QuoteStatus::Accepted));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::enums::ParseEnumError;

/// Quotation lifecycle status.
///
/// State transitions are enforced via
/// [`can_transition_to`](QuoteStatus::can_transition_to).
///
/// # Terminal States
///
/// - [`Accepted`](QuoteStatus::Accepted) - Customer accepted the quote
/// - [`Rejected`](QuoteStatus::Rejected) - Customer rejected the quote
/// - [`Expired`](QuoteStatus::Expired) - Validity window elapsed
///
/// Only [`Draft`](QuoteStatus::Draft) quotations may be recalculated;
/// `Sent` and later states are immutable except for the status
/// transition itself.
///
/// # Examples
///
/// ```
/// use seaquote::domain::value_objects::quote_status::QuoteStatus;
///
/// assert!(QuoteStatus::Draft.is_recalculable());
/// assert!(QuoteStatus::Accepted.is_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum QuoteStatus {
    /// Quotation created but not yet sent to the customer.
    #[default]
    Draft = 0,

    /// Quotation sent, awaiting customer response.
    Sent = 1,

    /// Customer accepted the quotation (terminal).
    Accepted = 2,

    /// Customer rejected the quotation (terminal).
    Rejected = 3,

    /// Validity window elapsed without a response (terminal).
    Expired = 4,
}

impl QuoteStatus {
    /// Returns true if this is a terminal state.
    ///
    /// # Examples
    ///
    /// ```
    /// use seaquote::domain::value_objects::quote_status::QuoteStatus;
    ///
    /// assert!(!QuoteStatus::Draft.is_terminal());
    /// assert!(!QuoteStatus::Sent.is_terminal());
    /// assert!(QuoteStatus::Accepted.is_terminal());
    /// assert!(QuoteStatus::Rejected.is_terminal());
    /// assert!(QuoteStatus::Expired.is_terminal());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Expired)
    }

    /// Returns true if the quotation may still be recalculated.
    ///
    /// Only draft quotations may be recalculated; once sent, the priced
    /// figures are frozen.
    #[inline]
    #[must_use]
    pub const fn is_recalculable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if this state can transition to the target state.
    ///
    /// Enforces the quotation state machine:
    /// - Draft → Sent
    /// - Sent → Accepted, Rejected, Expired
    /// - Terminal states → (none)
    ///
    /// # Examples
    ///
    /// ```
    /// use seaquote::domain::value_objects::quote_status::QuoteStatus;
    ///
    /// assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Expired));
    /// assert!(!QuoteStatus::Draft.can_transition_to(QuoteStatus::Rejected));
    /// assert!(!QuoteStatus::Expired.can_transition_to(QuoteStatus::Sent));
    /// ```
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Sent)
                | (Self::Sent, Self::Accepted)
                | (Self::Sent, Self::Rejected)
                | (Self::Sent, Self::Expired)
        )
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "DRAFT"),
            Self::Sent => write!(f, "SENT"),
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

impl FromStr for QuoteStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "SENT" => Ok(Self::Sent),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(ParseEnumError::InvalidValue("QuoteStatus", s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL: [QuoteStatus; 5] = [
        QuoteStatus::Draft,
        QuoteStatus::Sent,
        QuoteStatus::Accepted,
        QuoteStatus::Rejected,
        QuoteStatus::Expired,
    ];

    mod transitions {
        use super::*;

        #[test]
        fn draft_only_transitions_to_sent() {
            assert!(QuoteStatus::Draft.can_transition_to(QuoteStatus::Sent));
            assert!(!QuoteStatus::Draft.can_transition_to(QuoteStatus::Accepted));
            assert!(!QuoteStatus::Draft.can_transition_to(QuoteStatus::Rejected));
            assert!(!QuoteStatus::Draft.can_transition_to(QuoteStatus::Expired));
        }

        #[test]
        fn sent_transitions_to_all_terminals() {
            assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Accepted));
            assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Rejected));
            assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Expired));
            assert!(!QuoteStatus::Sent.can_transition_to(QuoteStatus::Draft));
        }

        #[test]
        fn terminal_states_have_no_transitions() {
            for from in ALL.into_iter().filter(|s| s.is_terminal()) {
                for to in ALL {
                    assert!(!from.can_transition_to(to), "{from} -> {to} must be rejected");
                }
            }
        }

        #[test]
        fn no_state_transitions_to_itself() {
            for state in ALL {
                assert!(!state.can_transition_to(state));
            }
        }
    }

    mod predicates {
        use super::*;

        #[test]
        fn only_draft_is_recalculable() {
            assert!(QuoteStatus::Draft.is_recalculable());
            for state in ALL.into_iter().filter(|s| *s != QuoteStatus::Draft) {
                assert!(!state.is_recalculable());
            }
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn display_and_parse_roundtrip() {
            for state in ALL {
                let parsed: QuoteStatus = state.to_string().parse().unwrap();
                assert_eq!(parsed, state);
            }
        }

        #[test]
        fn serde_roundtrip() {
            let json = serde_json::to_string(&QuoteStatus::Sent).unwrap();
            assert_eq!(json, "\"SENT\"");
            let back: QuoteStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, QuoteStatus::Sent);
        }
    }
}
