//! # Listing DTOs
//!
//! Data transfer objects for resale marketplace operations.
//!
//! These DTOs decouple the API layer from the domain layer, providing
//! validation and serialization for listing-related requests and
//! responses.

use crate::domain::entities::TicketListing;
use crate::domain::services::ResaleCeiling;
use crate::domain::value_objects::{
    EventId, ListingId, ListingStatus, Money, PaymentIntentId, TicketId, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request to list a ticket for resale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingRequest {
    /// The ticket to list.
    pub ticket_id: TicketId,
    /// Asking price in minor currency units.
    pub price: Money,
}

impl CreateListingRequest {
    /// Creates a new `CreateListingRequest`.
    #[must_use]
    pub fn new(ticket_id: TicketId, price: Money) -> Self {
        Self { ticket_id, price }
    }

    /// Validates the request fields.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if !self.price.is_positive() {
            return Err("price must be greater than zero".to_string());
        }

        Ok(())
    }
}

impl fmt::Display for CreateListingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CreateListingRequest {{ ticket: {}, price: {} }}",
            self.ticket_id, self.price
        )
    }
}

/// A listing as returned to API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDetails {
    /// Listing ID.
    pub id: ListingId,
    /// The ticket on offer.
    pub ticket_id: TicketId,
    /// The event the ticket admits to.
    pub event_id: EventId,
    /// The selling user.
    pub seller_id: UserId,
    /// The buyer, set once sold.
    pub buyer_id: Option<UserId>,
    /// Asking price in minor currency units.
    pub price: Money,
    /// Current listing status.
    pub status: ListingStatus,
    /// When the listing was created.
    pub created_at: Timestamp,
    /// When the listing stops being purchasable.
    pub expires_at: Timestamp,
    /// When the listing sold, if it did.
    pub sold_at: Option<Timestamp>,
}

impl ListingDetails {
    /// Builds the view from a domain listing.
    #[must_use]
    pub fn from_entity(listing: &TicketListing) -> Self {
        Self {
            id: listing.id(),
            ticket_id: listing.ticket_id(),
            event_id: listing.event_id(),
            seller_id: listing.seller_id(),
            buyer_id: listing.buyer_id(),
            price: listing.price(),
            status: listing.status(),
            created_at: listing.created_at(),
            expires_at: listing.expires_at(),
            sold_at: listing.sold_at(),
        }
    }
}

/// Response after creating a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingResponse {
    /// The created listing.
    pub listing: ListingDetails,
    /// The price ceiling the listing was validated against.
    pub ceiling: ResaleCeiling,
}

impl CreateListingResponse {
    /// Creates a new `CreateListingResponse`.
    #[must_use]
    pub fn new(listing: ListingDetails, ceiling: ResaleCeiling) -> Self {
        Self { listing, ceiling }
    }
}

/// Request to change an active listing.
///
/// The price is the only field a seller may change; everything else on a
/// listing is fixed at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateListingRequest {
    /// New asking price, if changing it.
    pub price: Option<Money>,
}

impl UpdateListingRequest {
    /// Creates a new `UpdateListingRequest`.
    #[must_use]
    pub fn new(price: Option<Money>) -> Self {
        Self { price }
    }

    /// Returns true if no field is being changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.price.is_none()
    }

    /// Validates the request fields.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(price) = self.price
            && !price.is_positive()
        {
            return Err("price must be greater than zero".to_string());
        }

        Ok(())
    }
}

impl fmt::Display for UpdateListingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.price {
            Some(price) => write!(f, "UpdateListingRequest {{ price: {} }}", price),
            None => write!(f, "UpdateListingRequest {{ }}"),
        }
    }
}

/// Request to purchase a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseListingRequest {
    /// Where the payment receipt goes.
    pub contact_email: String,
}

impl PurchaseListingRequest {
    /// Creates a new `PurchaseListingRequest`.
    #[must_use]
    pub fn new(contact_email: impl Into<String>) -> Self {
        Self {
            contact_email: contact_email.into(),
        }
    }

    /// Validates the request fields.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.contact_email.trim().is_empty() {
            return Err("contact_email cannot be empty".to_string());
        }

        Ok(())
    }
}

impl fmt::Display for PurchaseListingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PurchaseListingRequest {{ contact: {} }}",
            self.contact_email
        )
    }
}

/// What the buyer pays, broken into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// The seller's asking price.
    pub ticket_price: Money,
    /// Platform fee added on top.
    pub platform_fee: Money,
    /// Total charged to the buyer.
    pub total_amount: Money,
}

impl PriceBreakdown {
    /// Creates a new `PriceBreakdown`.
    #[must_use]
    pub fn new(ticket_price: Money, platform_fee: Money, total_amount: Money) -> Self {
        Self {
            ticket_price,
            platform_fee,
            total_amount,
        }
    }
}

/// Handle the front end needs to drive the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHandle {
    /// Gateway intent identifier.
    pub payment_intent_id: PaymentIntentId,
    /// Secret used client-side to confirm the payment.
    pub client_secret: Option<String>,
}

impl PaymentHandle {
    /// Creates a new `PaymentHandle`.
    #[must_use]
    pub fn new(payment_intent_id: PaymentIntentId, client_secret: Option<String>) -> Self {
        Self {
            payment_intent_id,
            client_secret,
        }
    }
}

/// Response after starting a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseListingResponse {
    /// The listing being purchased.
    pub listing: ListingDetails,
    /// Payment intent handle for the front end.
    pub payment: PaymentHandle,
    /// Price breakdown behind the charged amount.
    pub breakdown: PriceBreakdown,
}

impl PurchaseListingResponse {
    /// Creates a new `PurchaseListingResponse`.
    #[must_use]
    pub fn new(listing: ListingDetails, payment: PaymentHandle, breakdown: PriceBreakdown) -> Self {
        Self {
            listing,
            payment,
            breakdown,
        }
    }
}

/// Request to settle a purchase after payment confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlePurchaseRequest {
    /// The payment intent reported as succeeded.
    pub payment_intent_id: String,
}

impl SettlePurchaseRequest {
    /// Creates a new `SettlePurchaseRequest`.
    #[must_use]
    pub fn new(payment_intent_id: impl Into<String>) -> Self {
        Self {
            payment_intent_id: payment_intent_id.into(),
        }
    }

    /// Validates the request fields.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.payment_intent_id.trim().is_empty() {
            return Err("payment_intent_id cannot be empty".to_string());
        }

        Ok(())
    }
}

impl fmt::Display for SettlePurchaseRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SettlePurchaseRequest {{ intent: {} }}",
            self.payment_intent_id
        )
    }
}

/// Response after settling a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlePurchaseResponse {
    /// The listing in its settled state.
    pub listing: ListingDetails,
}

impl SettlePurchaseResponse {
    /// Creates a new `SettlePurchaseResponse`.
    #[must_use]
    pub fn new(listing: ListingDetails) -> Self {
        Self { listing }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn create_listing_request_validate_success() {
        let request =
            CreateListingRequest::new(TicketId::new_v4(), Money::from_minor(11_000).unwrap());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn create_listing_request_validate_zero_price() {
        let request = CreateListingRequest::new(TicketId::new_v4(), Money::ZERO);
        assert!(request.validate().is_err());
    }

    #[test]
    fn update_listing_request_empty_is_a_noop_marker() {
        let request = UpdateListingRequest::default();
        assert!(request.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn update_listing_request_rejects_zero_price() {
        let request = UpdateListingRequest::new(Some(Money::ZERO));
        assert!(!request.is_empty());
        assert!(request.validate().is_err());
    }

    #[test]
    fn purchase_request_rejects_blank_email() {
        let request = PurchaseListingRequest::new("   ");
        assert!(request.validate().is_err());
    }

    #[test]
    fn settle_request_rejects_blank_intent() {
        let request = SettlePurchaseRequest::new("");
        assert!(request.validate().is_err());
    }

    #[test]
    fn negative_price_fails_deserialization() {
        let result: Result<CreateListingRequest, _> = serde_json::from_value(serde_json::json!({
            "ticket_id": TicketId::new_v4(),
            "price": -500,
        }));
        assert!(result.is_err());
    }
}
