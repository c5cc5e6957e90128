//! # Transfer Status
//!
//! Ticket transfer lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//! Pending → Accepted / Rejected / Expired / Cancelled   (all terminal)
//! ```

use super::enums::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket transfer status.
///
/// A transfer is resolved exactly once: the recipient accepts or rejects,
/// the sender cancels, or the offer lapses past its expiry. Terminal
/// transfers are immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum TransferStatus {
    /// Awaiting the recipient's response.
    #[default]
    Pending = 0,

    /// Recipient accepted; ownership moved (terminal).
    Accepted = 1,

    /// Recipient declined (terminal).
    Rejected = 2,

    /// Lapsed past its expiry time (terminal).
    Expired = 3,

    /// Withdrawn by the sender (terminal).
    Cancelled = 4,
}

impl TransferStatus {
    /// Returns true if this is a terminal state.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if the transfer is awaiting a response.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if this state can transition to the target state.
    ///
    /// Rules: Pending → Accepted, Rejected, Expired, Cancelled; terminal
    /// states → (none).
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Expired)
                | (Self::Pending, Self::Cancelled)
        )
    }

    /// Returns the valid next states from this state.
    #[must_use]
    pub fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Pending => vec![
                Self::Accepted,
                Self::Rejected,
                Self::Expired,
                Self::Cancelled,
            ],
            Self::Accepted | Self::Rejected | Self::Expired | Self::Cancelled => vec![],
        }
    }

    /// Returns the numeric value of this status.
    #[inline]
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TransferStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            "EXPIRED" => Ok(Self::Expired),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(ParseEnumError {
                value: s.to_string(),
                expected: "TransferStatus",
            }),
        }
    }
}

impl TryFrom<u8> for TransferStatus {
    type Error = InvalidTransferStatusError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Accepted),
            2 => Ok(Self::Rejected),
            3 => Ok(Self::Expired),
            4 => Ok(Self::Cancelled),
            _ => Err(InvalidTransferStatusError(value)),
        }
    }
}

/// Error returned when converting an invalid u8 to TransferStatus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransferStatusError(pub u8);

impl fmt::Display for InvalidTransferStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid transfer status value: {}", self.0)
    }
}

impl std::error::Error for InvalidTransferStatusError {}
