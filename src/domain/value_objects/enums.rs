//! # Domain Enums
//!
//! Small closed vocabularies shared across the domain: event lifecycle
//! status, resale cap policy types, and transfer responses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing an enum from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {expected} value: {value}")]
pub struct ParseEnumError {
    /// The rejected input.
    pub value: String,
    /// Name of the enum that was expected.
    pub expected: &'static str,
}

impl ParseEnumError {
    fn new(value: impl Into<String>, expected: &'static str) -> Self {
        Self {
            value: value.into(),
            expected,
        }
    }
}

/// Lifecycle status of an event (show).
///
/// Events are owned by the catalogue service; this core only reads the
/// status to gate resale and transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Not yet published.
    #[default]
    Draft,

    /// On sale / visible.
    Published,

    /// Cancelled by the organizer.
    Cancelled,

    /// The event has taken place.
    Completed,
}

impl EventStatus {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "PUBLISHED" => Ok(Self::Published),
            "CANCELLED" => Ok(Self::Cancelled),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(ParseEnumError::new(s, "EventStatus")),
        }
    }
}

/// Resale price-cap policy configured on an event.
///
/// Determines which ceiling function [`max_resale_price`] applies when a
/// ticket for the event is listed.
///
/// [`max_resale_price`]: crate::domain::services::resale_pricing::max_resale_price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResaleCapType {
    /// Resale at no more than the ticket's face value.
    FaceValueOnly,

    /// Resale at no more than the price originally paid (face value plus
    /// original fees).
    FaceValuePlusFees,

    /// Resale capped at a percentage of face value.
    PercentageCap,

    /// No ceiling.
    NoCap,

    /// A fixed cap amount configured on the event.
    Custom,
}

impl ResaleCapType {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FaceValueOnly => "FACE_VALUE_ONLY",
            Self::FaceValuePlusFees => "FACE_VALUE_PLUS_FEES",
            Self::PercentageCap => "PERCENTAGE_CAP",
            Self::NoCap => "NO_CAP",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for ResaleCapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResaleCapType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FACE_VALUE_ONLY" => Ok(Self::FaceValueOnly),
            "FACE_VALUE_PLUS_FEES" => Ok(Self::FaceValuePlusFees),
            "PERCENTAGE_CAP" => Ok(Self::PercentageCap),
            "NO_CAP" => Ok(Self::NoCap),
            "CUSTOM" => Ok(Self::Custom),
            _ => Err(ParseEnumError::new(s, "ResaleCapType")),
        }
    }
}

/// A recipient's answer to a pending transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferResponse {
    /// Take ownership of the ticket.
    Accept,

    /// Decline the transfer.
    Reject,
}

impl TransferResponse {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "ACCEPT",
            Self::Reject => "REJECT",
        }
    }
}

impl fmt::Display for TransferResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransferResponse {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCEPT" => Ok(Self::Accept),
            "REJECT" => Ok(Self::Reject),
            _ => Err(ParseEnumError::new(s, "TransferResponse")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_are_inverse() {
        for status in [
            EventStatus::Draft,
            EventStatus::Published,
            EventStatus::Cancelled,
            EventStatus::Completed,
        ] {
            assert_eq!(status.to_string().parse::<EventStatus>().unwrap(), status);
        }

        for cap in [
            ResaleCapType::FaceValueOnly,
            ResaleCapType::FaceValuePlusFees,
            ResaleCapType::PercentageCap,
            ResaleCapType::NoCap,
            ResaleCapType::Custom,
        ] {
            assert_eq!(cap.to_string().parse::<ResaleCapType>().unwrap(), cap);
        }
    }

    #[test]
    fn unknown_values_are_rejected_with_context() {
        let err = "SIDEWAYS".parse::<EventStatus>().unwrap_err();
        assert_eq!(err.expected, "EventStatus");
        assert_eq!(err.value, "SIDEWAYS");
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&ResaleCapType::PercentageCap).unwrap();
        assert_eq!(json, "\"PERCENTAGE_CAP\"");

        let response: TransferResponse = serde_json::from_str("\"ACCEPT\"").unwrap();
        assert_eq!(response, TransferResponse::Accept);
    }
}
