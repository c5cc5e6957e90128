//! # Ticket Status
//!
//! Ticket lifecycle state machine.
//!
//! A ticket is the shared resource contended between the resale marketplace
//! and the transfer flow. Its status is the gate that keeps the two from
//! encumbering the same ticket twice.
//!
//! # State Machine
//!
//! ```text
//! Valid ⇄ ListedForSale      (listing created / listing cancelled, expired
//! Valid ⇄ PendingTransfer     or settled; resolution always returns the
//!   ↓                         ticket to Valid, possibly under a new owner)
//! Used / Cancelled            (terminal, set by scanning / refund flows)
//! ```
//!
//! # Examples
//!
//! ```
//! use boxoffice::domain::value_objects::ticket_status::TicketStatus;
//!
//! let status = TicketStatus::Valid;
//! assert!(status.can_transition_to(TicketStatus::ListedForSale));
//! assert!(!status.can_transition_to(TicketStatus::Valid));
//! ```

use super::enums::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket lifecycle status.
///
/// Transitions are enforced via [`can_transition_to`](TicketStatus::can_transition_to).
/// Only a `Valid` ticket can be listed for resale or offered for transfer,
/// and at most one encumbrance exists at a time because both paths move the
/// status off `Valid`.
///
/// # Terminal States
///
/// - [`Used`](TicketStatus::Used) - scanned at the door
/// - [`Cancelled`](TicketStatus::Cancelled) - voided/refunded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum TicketStatus {
    /// Held by its owner, free to list or transfer.
    #[default]
    Valid = 0,

    /// Encumbered by an active resale listing.
    ListedForSale = 1,

    /// Encumbered by a pending transfer.
    PendingTransfer = 2,

    /// Scanned at the event (terminal).
    Used = 3,

    /// Voided or refunded (terminal).
    Cancelled = 4,
}

impl TicketStatus {
    /// Returns true if this is a terminal state.
    ///
    /// # Examples
    ///
    /// ```
    /// use boxoffice::domain::value_objects::ticket_status::TicketStatus;
    ///
    /// assert!(TicketStatus::Used.is_terminal());
    /// assert!(TicketStatus::Cancelled.is_terminal());
    /// assert!(!TicketStatus::Valid.is_terminal());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Used | Self::Cancelled)
    }

    /// Returns true if this state can transition to the target state.
    ///
    /// Rules:
    /// - Valid → ListedForSale, PendingTransfer, Used, Cancelled
    /// - ListedForSale → Valid
    /// - PendingTransfer → Valid
    /// - Terminal states → (none)
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            // From Valid
            (Self::Valid, Self::ListedForSale)
                | (Self::Valid, Self::PendingTransfer)
                | (Self::Valid, Self::Used)
                | (Self::Valid, Self::Cancelled)
                // Encumbrances always resolve back to Valid
                | (Self::ListedForSale, Self::Valid)
                | (Self::PendingTransfer, Self::Valid)
        )
    }

    /// Returns the valid next states from this state.
    #[must_use]
    pub fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Valid => vec![
                Self::ListedForSale,
                Self::PendingTransfer,
                Self::Used,
                Self::Cancelled,
            ],
            Self::ListedForSale | Self::PendingTransfer => vec![Self::Valid],
            Self::Used | Self::Cancelled => vec![],
        }
    }

    /// Returns true if the ticket is free to be listed or transferred.
    #[inline]
    #[must_use]
    pub const fn is_sellable(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns true if the ticket is currently encumbered by a listing or
    /// a pending transfer.
    #[inline]
    #[must_use]
    pub const fn is_encumbered(&self) -> bool {
        matches!(self, Self::ListedForSale | Self::PendingTransfer)
    }

    /// Returns the numeric value of this status.
    #[inline]
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Valid => "VALID",
            Self::ListedForSale => "LISTED_FOR_SALE",
            Self::PendingTransfer => "PENDING_TRANSFER",
            Self::Used => "USED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TicketStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VALID" => Ok(Self::Valid),
            "LISTED_FOR_SALE" => Ok(Self::ListedForSale),
            "PENDING_TRANSFER" => Ok(Self::PendingTransfer),
            "USED" => Ok(Self::Used),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(ParseEnumError {
                value: s.to_string(),
                expected: "TicketStatus",
            }),
        }
    }
}

impl TryFrom<u8> for TicketStatus {
    type Error = InvalidTicketStatusError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Valid),
            1 => Ok(Self::ListedForSale),
            2 => Ok(Self::PendingTransfer),
            3 => Ok(Self::Used),
            4 => Ok(Self::Cancelled),
            _ => Err(InvalidTicketStatusError(value)),
        }
    }
}

/// Error returned when converting an invalid u8 to TicketStatus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTicketStatusError(pub u8);

impl fmt::Display for InvalidTicketStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid ticket status value: {}", self.0)
    }
}

impl std::error::Error for InvalidTicketStatusError {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod transitions {
        use super::*;

        #[test]
        fn valid_can_be_encumbered_or_closed() {
            let status = TicketStatus::Valid;
            assert!(status.can_transition_to(TicketStatus::ListedForSale));
            assert!(status.can_transition_to(TicketStatus::PendingTransfer));
            assert!(status.can_transition_to(TicketStatus::Used));
            assert!(status.can_transition_to(TicketStatus::Cancelled));
        }

        #[test]
        fn encumbrances_only_resolve_to_valid() {
            assert!(TicketStatus::ListedForSale.can_transition_to(TicketStatus::Valid));
            assert!(TicketStatus::PendingTransfer.can_transition_to(TicketStatus::Valid));

            // A listed ticket cannot jump straight into a transfer
            assert!(
                !TicketStatus::ListedForSale.can_transition_to(TicketStatus::PendingTransfer)
            );
            assert!(
                !TicketStatus::PendingTransfer.can_transition_to(TicketStatus::ListedForSale)
            );
            assert!(!TicketStatus::ListedForSale.can_transition_to(TicketStatus::Used));
        }

        #[test]
        fn terminal_states_cannot_transition() {
            for terminal in [TicketStatus::Used, TicketStatus::Cancelled] {
                for target in [
                    TicketStatus::Valid,
                    TicketStatus::ListedForSale,
                    TicketStatus::PendingTransfer,
                    TicketStatus::Used,
                    TicketStatus::Cancelled,
                ] {
                    assert!(
                        !terminal.can_transition_to(target),
                        "{:?} should not transition to {:?}",
                        terminal,
                        target
                    );
                }
            }
        }

        #[test]
        fn valid_transitions_lists_match_can_transition_to() {
            for status in [
                TicketStatus::Valid,
                TicketStatus::ListedForSale,
                TicketStatus::PendingTransfer,
                TicketStatus::Used,
                TicketStatus::Cancelled,
            ] {
                for target in status.valid_transitions() {
                    assert!(status.can_transition_to(target));
                }
            }
        }
    }

    mod helpers {
        use super::*;

        #[test]
        fn only_valid_is_sellable() {
            assert!(TicketStatus::Valid.is_sellable());
            assert!(!TicketStatus::ListedForSale.is_sellable());
            assert!(!TicketStatus::PendingTransfer.is_sellable());
            assert!(!TicketStatus::Used.is_sellable());
        }

        #[test]
        fn encumbered_states() {
            assert!(TicketStatus::ListedForSale.is_encumbered());
            assert!(TicketStatus::PendingTransfer.is_encumbered());
            assert!(!TicketStatus::Valid.is_encumbered());
            assert!(!TicketStatus::Cancelled.is_encumbered());
        }
    }

    mod conversion {
        use super::*;

        #[test]
        fn u8_round_trip() {
            for i in 0..=4 {
                let status = TicketStatus::try_from(i).unwrap();
                assert_eq!(status.as_u8(), i);
            }
            assert!(TicketStatus::try_from(5).is_err());
        }

        #[test]
        fn string_round_trip() {
            for status in [
                TicketStatus::Valid,
                TicketStatus::ListedForSale,
                TicketStatus::PendingTransfer,
                TicketStatus::Used,
                TicketStatus::Cancelled,
            ] {
                assert_eq!(
                    status.to_string().parse::<TicketStatus>().unwrap(),
                    status
                );
            }
        }

        #[test]
        fn serde_screaming_snake_case() {
            let json = serde_json::to_string(&TicketStatus::ListedForSale).unwrap();
            assert_eq!(json, "\"LISTED_FOR_SALE\"");
        }
    }

    #[test]
    fn default_is_valid() {
        assert_eq!(TicketStatus::default(), TicketStatus::Valid);
    }
}
