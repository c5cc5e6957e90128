//! # Listing Status
//!
//! Resale listing lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//! Active → Sold / Cancelled / Expired   (all terminal)
//! ```

use super::enums::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resale listing status.
///
/// A listing starts `Active` and terminates exactly once: bought
/// (`Sold`), withdrawn by the seller (`Cancelled`), or lapsed past its
/// expiry (`Expired`). Terminal listings are immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ListingStatus {
    /// Open for purchase.
    #[default]
    Active = 0,

    /// Withdrawn by the seller (terminal).
    Cancelled = 1,

    /// Lapsed past its expiry time (terminal).
    Expired = 2,

    /// Purchased and settled (terminal).
    Sold = 3,
}

impl ListingStatus {
    /// Returns true if this is a terminal state.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Returns true if the listing is open for purchase.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns true if this state can transition to the target state.
    ///
    /// Rules: Active → Cancelled, Expired, Sold; terminal states → (none).
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Active, Self::Cancelled)
                | (Self::Active, Self::Expired)
                | (Self::Active, Self::Sold)
        )
    }

    /// Returns the valid next states from this state.
    #[must_use]
    pub fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Active => vec![Self::Cancelled, Self::Expired, Self::Sold],
            Self::Cancelled | Self::Expired | Self::Sold => vec![],
        }
    }

    /// Returns the numeric value of this status.
    #[inline]
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
            Self::Sold => "SOLD",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ListingStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "CANCELLED" => Ok(Self::Cancelled),
            "EXPIRED" => Ok(Self::Expired),
            "SOLD" => Ok(Self::Sold),
            _ => Err(ParseEnumError {
                value: s.to_string(),
                expected: "ListingStatus",
            }),
        }
    }
}

impl TryFrom<u8> for ListingStatus {
    type Error = InvalidListingStatusError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Active),
            1 => Ok(Self::Cancelled),
            2 => Ok(Self::Expired),
            3 => Ok(Self::Sold),
            _ => Err(InvalidListingStatusError(value)),
        }
    }
}

/// Error returned when converting an invalid u8 to ListingStatus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidListingStatusError(pub u8);

impl fmt::Display for InvalidListingStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid listing status value: {}", self.0)
    }
}

impl std::error::Error for InvalidListingStatusError {}
