//! # Domain Events
//!
//! Events describing committed marketplace changes, published best-effort
//! after each successful store mutation.
//!
//! ## Listing Events
//!
//! - `ListingCreated`: Ticket went up for resale
//! - `ListingRepriced`: Seller changed the asking price
//! - `ListingCancelled`: Seller withdrew the listing
//! - `ListingExpired`: Listing deadline passed
//! - `ListingSold`: Payment settled and ownership moved
//!
//! ## Transfer Events
//!
//! - `TransferCreated`: Hand-off initiated to a recipient email
//! - `TransferResponded`: Recipient accepted or rejected
//! - `TransferCancelled`: Sender withdrew the hand-off
//! - `TransferExpired`: Claim window closed

use crate::domain::value_objects::{
    EmailAddress, EventId, ListingId, Money, TicketId, TransferId, TransferResponse, UserId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A committed marketplace change, shaped for audit trails and downstream
/// consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketplaceEvent {
    /// A ticket went up for resale.
    ListingCreated {
        /// The new listing.
        listing_id: ListingId,
        /// The ticket being offered.
        ticket_id: TicketId,
        /// The event the ticket admits to.
        event_id: EventId,
        /// The seller.
        seller_id: UserId,
        /// Asking price in minor units.
        price: Money,
    },
    /// A seller changed an active listing's asking price.
    ListingRepriced {
        /// The repriced listing.
        listing_id: ListingId,
        /// The ticket being offered.
        ticket_id: TicketId,
        /// New asking price in minor units.
        price: Money,
    },
    /// A seller withdrew an active listing.
    ListingCancelled {
        /// The cancelled listing.
        listing_id: ListingId,
        /// The ticket released back to the seller.
        ticket_id: TicketId,
    },
    /// An active listing passed its deadline.
    ListingExpired {
        /// The expired listing.
        listing_id: ListingId,
        /// The ticket released back to the seller.
        ticket_id: TicketId,
    },
    /// A purchase settled and ownership moved to the buyer.
    ListingSold {
        /// The sold listing.
        listing_id: ListingId,
        /// The ticket that changed hands.
        ticket_id: TicketId,
        /// The previous owner.
        seller_id: UserId,
        /// The new owner.
        buyer_id: UserId,
        /// Settled price in minor units, fees not included.
        price: Money,
    },
    /// A hand-off was initiated to a recipient email.
    TransferCreated {
        /// The new transfer.
        transfer_id: TransferId,
        /// The ticket being handed off.
        ticket_id: TicketId,
        /// The sender.
        sender_id: UserId,
        /// Where the claim invitation was addressed.
        recipient_email: EmailAddress,
    },
    /// The recipient accepted or rejected a pending hand-off.
    TransferResponded {
        /// The resolved transfer.
        transfer_id: TransferId,
        /// The ticket involved.
        ticket_id: TicketId,
        /// Which way the recipient responded.
        response: TransferResponse,
        /// The accepting account, present on acceptance.
        receiver_id: Option<UserId>,
    },
    /// The sender withdrew a pending hand-off.
    TransferCancelled {
        /// The cancelled transfer.
        transfer_id: TransferId,
        /// The ticket released back to the sender.
        ticket_id: TicketId,
    },
    /// A pending hand-off passed its claim deadline.
    TransferExpired {
        /// The expired transfer.
        transfer_id: TransferId,
        /// The ticket released back to the sender.
        ticket_id: TicketId,
    },
}

impl MarketplaceEvent {
    /// Returns the event name used in logs and audit trails.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ListingCreated { .. } => "listing_created",
            Self::ListingRepriced { .. } => "listing_repriced",
            Self::ListingCancelled { .. } => "listing_cancelled",
            Self::ListingExpired { .. } => "listing_expired",
            Self::ListingSold { .. } => "listing_sold",
            Self::TransferCreated { .. } => "transfer_created",
            Self::TransferResponded { .. } => "transfer_responded",
            Self::TransferCancelled { .. } => "transfer_cancelled",
            Self::TransferExpired { .. } => "transfer_expired",
        }
    }

    /// Returns the ticket every marketplace event ultimately concerns.
    #[must_use]
    pub const fn ticket_id(&self) -> TicketId {
        match self {
            Self::ListingCreated { ticket_id, .. }
            | Self::ListingRepriced { ticket_id, .. }
            | Self::ListingCancelled { ticket_id, .. }
            | Self::ListingExpired { ticket_id, .. }
            | Self::ListingSold { ticket_id, .. }
            | Self::TransferCreated { ticket_id, .. }
            | Self::TransferResponded { ticket_id, .. }
            | Self::TransferCancelled { ticket_id, .. }
            | Self::TransferExpired { ticket_id, .. } => *ticket_id,
        }
    }
}

impl fmt::Display for MarketplaceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ticket {})", self.name(), self.ticket_id())
    }
}
