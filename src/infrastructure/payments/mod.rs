//! # Payment Gateway
//!
//! Port and shared types for collecting resale payments.
//!
//! The marketplace never touches card details: it asks the gateway for a
//! payment intent carrying the purchase breakdown and marketplace
//! metadata, hands the client secret to the front end, and later settles
//! from the intent's terminal status.
//!
//! ## Implementations
//!
//! - [`stripe::StripeGateway`]: Stripe-backed HTTP client
//! - [`simulator::SimulatedGateway`]: deterministic in-process gateway for
//!   tests and local development

pub mod simulator;
pub mod stripe;

use crate::domain::value_objects::{
    EmailAddress, EventId, ListingId, Money, PaymentIntentId, TicketId, UserId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub use simulator::{SimulatedGateway, SimulatorConfig};
pub use stripe::{StripeConfig, StripeGateway};

/// Error type for payment gateway operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The gateway refused to create or confirm the intent.
    #[error("payment declined: {0}")]
    Declined(String),

    /// No intent exists under the given identifier.
    #[error("payment intent not found: {0}")]
    IntentNotFound(String),

    /// The HTTP request to the gateway failed.
    #[error("gateway request failed: {0}")]
    Request(String),

    /// The gateway answered with something this client cannot interpret.
    #[error("gateway response malformed: {0}")]
    Protocol(String),
}

impl PaymentError {
    /// Creates a declined error.
    #[must_use]
    pub fn declined(reason: impl Into<String>) -> Self {
        Self::Declined(reason.into())
    }

    /// Creates an intent not found error.
    #[must_use]
    pub fn intent_not_found(id: impl fmt::Display) -> Self {
        Self::IntentNotFound(id.to_string())
    }

    /// Creates a request error.
    #[must_use]
    pub fn request(msg: impl fmt::Display) -> Self {
        Self::Request(msg.to_string())
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

/// Result type for payment gateway operations.
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Lifecycle status of a payment intent, as this marketplace reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentIntentStatus {
    /// Awaiting a payment method from the buyer.
    RequiresPaymentMethod,
    /// Awaiting an additional buyer action, e.g. 3-D Secure.
    RequiresAction,
    /// Submitted and processing.
    Processing,
    /// Funds captured. The only status settlement accepts.
    Succeeded,
    /// Cancelled before completion.
    Cancelled,
    /// The attempt failed.
    Failed,
}

impl PaymentIntentStatus {
    /// Returns true if the intent captured funds.
    #[inline]
    #[must_use]
    pub const fn is_succeeded(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RequiresPaymentMethod => "REQUIRES_PAYMENT_METHOD",
            Self::RequiresAction => "REQUIRES_ACTION",
            Self::Processing => "PROCESSING",
            Self::Succeeded => "SUCCEEDED",
            Self::Cancelled => "CANCELLED",
            Self::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

/// Marketplace context attached to every intent, echoed back by the
/// gateway so settlement can locate the listing without a side channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    /// The listing being purchased.
    pub listing_id: ListingId,
    /// The ticket the listing offers.
    pub ticket_id: TicketId,
    /// The event the ticket admits to.
    pub event_id: EventId,
    /// The purchasing user.
    pub buyer_id: UserId,
    /// The selling user.
    pub seller_id: UserId,
    /// Payment kind discriminator, `"resale"` for marketplace purchases.
    pub kind: String,
}

impl PaymentMetadata {
    /// Metadata kind for resale purchases.
    pub const RESALE: &'static str = "resale";

    /// Creates resale purchase metadata.
    #[must_use]
    pub fn resale(
        listing_id: ListingId,
        ticket_id: TicketId,
        event_id: EventId,
        buyer_id: UserId,
        seller_id: UserId,
    ) -> Self {
        Self {
            listing_id,
            ticket_id,
            event_id,
            buyer_id,
            seller_id,
            kind: Self::RESALE.to_string(),
        }
    }

    /// Flattens the metadata into gateway key/value pairs.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("listing_id", self.listing_id.to_string()),
            ("ticket_id", self.ticket_id.to_string()),
            ("event_id", self.event_id.to_string()),
            ("buyer_id", self.buyer_id.to_string()),
            ("seller_id", self.seller_id.to_string()),
            ("kind", self.kind.clone()),
        ]
    }

    /// Rebuilds metadata from gateway key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Protocol`] when a key is missing or an ID
    /// does not parse.
    pub fn from_pairs(pairs: &HashMap<String, String>) -> PaymentResult<Self> {
        fn uuid_field(pairs: &HashMap<String, String>, key: &str) -> PaymentResult<uuid::Uuid> {
            let raw = pairs
                .get(key)
                .ok_or_else(|| PaymentError::protocol(format!("metadata missing {key}")))?;
            raw.parse()
                .map_err(|_| PaymentError::protocol(format!("metadata {key} is not a UUID")))
        }

        Ok(Self {
            listing_id: ListingId::new(uuid_field(pairs, "listing_id")?),
            ticket_id: TicketId::new(uuid_field(pairs, "ticket_id")?),
            event_id: EventId::new(uuid_field(pairs, "event_id")?),
            buyer_id: UserId::new(uuid_field(pairs, "buyer_id")?),
            seller_id: UserId::new(uuid_field(pairs, "seller_id")?),
            kind: pairs
                .get("kind")
                .cloned()
                .ok_or_else(|| PaymentError::protocol("metadata missing kind"))?,
        })
    }
}

/// Request to open a payment intent for a resale purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIntentRequest {
    /// Total to collect in minor units, ticket price plus platform fee.
    pub amount: Money,
    /// ISO currency code, lowercase, e.g. `"gbp"`.
    pub currency: String,
    /// Where the gateway sends the receipt.
    pub receipt_email: EmailAddress,
    /// Marketplace context echoed back at settlement.
    pub metadata: PaymentMetadata,
}

/// A payment intent as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Gateway-assigned intent identifier.
    pub id: PaymentIntentId,
    /// Secret the front end uses to drive the payment. Absent on
    /// retrievals that do not disclose it.
    pub client_secret: Option<String>,
    /// Current intent status.
    pub status: PaymentIntentStatus,
    /// Total in minor units.
    pub amount: Money,
    /// Marketplace context attached at creation.
    pub metadata: PaymentMetadata,
}

/// Port for the payment provider.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` for use in async contexts.
#[async_trait]
pub trait PaymentGateway: Send + Sync + fmt::Debug {
    /// Opens a payment intent for the given amount and metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway rejects the request or cannot be
    /// reached.
    async fn create_intent(&self, request: CreateIntentRequest) -> PaymentResult<PaymentIntent>;

    /// Retrieves an intent's current state.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::IntentNotFound`] for unknown identifiers,
    /// or another error if the gateway cannot be reached.
    async fn retrieve_intent(&self, id: &PaymentIntentId) -> PaymentResult<PaymentIntent>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn metadata_survives_the_gateway_round_trip() {
        let metadata = PaymentMetadata::resale(
            ListingId::new_v4(),
            TicketId::new_v4(),
            EventId::new_v4(),
            UserId::new_v4(),
            UserId::new_v4(),
        );

        let map: HashMap<String, String> = metadata
            .pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        assert_eq!(PaymentMetadata::from_pairs(&map).unwrap(), metadata);
    }

    #[test]
    fn malformed_metadata_is_a_protocol_error() {
        let mut map: HashMap<String, String> = HashMap::new();
        map.insert("listing_id".to_string(), "not-a-uuid".to_string());

        let err = PaymentMetadata::from_pairs(&map).unwrap_err();
        assert!(matches!(err, PaymentError::Protocol(_)));
    }

    #[test]
    fn only_succeeded_counts_as_paid() {
        assert!(PaymentIntentStatus::Succeeded.is_succeeded());
        assert!(!PaymentIntentStatus::Processing.is_succeeded());
        assert!(!PaymentIntentStatus::Failed.is_succeeded());
    }
}
