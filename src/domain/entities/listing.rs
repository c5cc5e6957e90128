//! # Resale Listing Aggregate
//!
//! A seller's offer of one ticket at a fixed, policy-checked price.
//!
//! A listing is created `Active` and ends in exactly one terminal state:
//! `Cancelled` by the seller, `Expired` when its deadline passes, or
//! `Sold` when a buyer's payment settles. Price caps are enforced at
//! creation time by the pricing service, not here.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{EventId, ListingId, ListingStatus, Money, TicketId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed-price resale offer for a single ticket.
///
/// # Invariants
///
/// - Status transitions follow [`ListingStatus`] rules
/// - `buyer_id` and `sold_at` are set exactly when the listing is `Sold`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketListing {
    /// Unique identifier for this listing.
    id: ListingId,
    /// The ticket being offered.
    ticket_id: TicketId,
    /// The event the ticket admits to, denormalized for queries.
    event_id: EventId,
    /// The user offering the ticket.
    seller_id: UserId,
    /// The buyer, set at settlement.
    buyer_id: Option<UserId>,
    /// Asking price in minor units, fees not included.
    price: Money,
    /// Current lifecycle status.
    status: ListingStatus,
    /// When this listing was created.
    created_at: Timestamp,
    /// When this listing was last updated.
    updated_at: Timestamp,
    /// Deadline after which the listing can no longer be bought.
    expires_at: Timestamp,
    /// When the sale settled, if it did.
    sold_at: Option<Timestamp>,
}

impl TicketListing {
    /// Creates a new `Active` listing.
    ///
    /// The caller supplies both timestamps: `created_at` from its clock and
    /// `expires_at` derived from the event schedule.
    #[must_use]
    pub fn new(
        ticket_id: TicketId,
        event_id: EventId,
        seller_id: UserId,
        price: Money,
        created_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            id: ListingId::new_v4(),
            ticket_id,
            event_id,
            seller_id,
            buyer_id: None,
            price,
            status: ListingStatus::Active,
            created_at,
            updated_at: created_at,
            expires_at,
            sold_at: None,
        }
    }

    /// Reconstructs a listing from storage.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: ListingId,
        ticket_id: TicketId,
        event_id: EventId,
        seller_id: UserId,
        buyer_id: Option<UserId>,
        price: Money,
        status: ListingStatus,
        created_at: Timestamp,
        updated_at: Timestamp,
        expires_at: Timestamp,
        sold_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            ticket_id,
            event_id,
            seller_id,
            buyer_id,
            price,
            status,
            created_at,
            updated_at,
            expires_at,
            sold_at,
        }
    }

    // ========== Lifecycle ==========

    /// Cancels the listing at the seller's request.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidListingTransition`] unless the listing
    /// is `Active`.
    pub fn cancel(&mut self, now: Timestamp) -> DomainResult<()> {
        self.transition_to(ListingStatus::Cancelled, now)
    }

    /// Marks the listing expired after its deadline passed.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidListingTransition`] unless the listing
    /// is `Active`.
    pub fn expire(&mut self, now: Timestamp) -> DomainResult<()> {
        self.transition_to(ListingStatus::Expired, now)
    }

    /// Settles the sale to `buyer_id`, recording the settlement time.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidListingTransition`] unless the listing
    /// is `Active`.
    pub fn sell(&mut self, buyer_id: UserId, now: Timestamp) -> DomainResult<()> {
        self.transition_to(ListingStatus::Sold, now)?;
        self.buyer_id = Some(buyer_id);
        self.sold_at = Some(now);
        Ok(())
    }

    /// Changes the asking price of a still-active listing.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidListingTransition`] unless the listing
    /// is `Active`.
    pub fn reprice(&mut self, price: Money, now: Timestamp) -> DomainResult<()> {
        if self.status != ListingStatus::Active {
            return Err(DomainError::InvalidListingTransition {
                from: self.status,
                to: ListingStatus::Active,
            });
        }
        self.price = price;
        self.updated_at = now;
        Ok(())
    }

    fn transition_to(&mut self, target: ListingStatus, now: Timestamp) -> DomainResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidListingTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    // ========== Accessors ==========

    /// Returns the listing ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ListingId {
        self.id
    }

    /// Returns the ticket ID.
    #[inline]
    #[must_use]
    pub fn ticket_id(&self) -> TicketId {
        self.ticket_id
    }

    /// Returns the event ID.
    #[inline]
    #[must_use]
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Returns the seller's user ID.
    #[inline]
    #[must_use]
    pub fn seller_id(&self) -> UserId {
        self.seller_id
    }

    /// Returns the buyer's user ID once sold.
    #[inline]
    #[must_use]
    pub fn buyer_id(&self) -> Option<UserId> {
        self.buyer_id
    }

    /// Returns the asking price in minor units.
    #[inline]
    #[must_use]
    pub fn price(&self) -> Money {
        self.price
    }

    /// Returns the current status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ListingStatus {
        self.status
    }

    /// Returns when this listing was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns when this listing was last updated.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Returns the expiry deadline.
    #[inline]
    #[must_use]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Returns when the sale settled, if it did.
    #[inline]
    #[must_use]
    pub fn sold_at(&self) -> Option<Timestamp> {
        self.sold_at
    }

    // ========== State Helpers ==========

    /// Returns true if the listing is still open for purchase.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns true if `user_id` created this listing.
    #[inline]
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.seller_id == user_id
    }

    /// Returns true if the deadline has passed, regardless of stored
    /// status. Stale `Active` rows are flipped lazily by the services.
    #[inline]
    #[must_use]
    pub fn is_past_deadline(&self, now: Timestamp) -> bool {
        now.is_after(self.expires_at)
    }
}

impl fmt::Display for TicketListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Listing {{ id: {}, ticket: {}, price: {}, status: {} }}",
            self.id, self.ticket_id, self.price, self.status
        )
    }
}
