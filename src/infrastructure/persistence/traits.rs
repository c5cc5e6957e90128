//! # Persistence Ports
//!
//! Trait definitions for marketplace storage and the user directory.
//!
//! The store exposes point lookups, filtered queries, and composite
//! mutations. Every composite mutation touches one or two rows
//! all-or-nothing and re-checks its precondition inside the transaction:
//! the row being moved must still hold the status the operation departs
//! from, otherwise the mutation fails with
//! [`StoreError::PreconditionFailed`] and nothing is written. Service
//! pre-checks make such conflicts rare; the in-transaction guard is what
//! makes them impossible to slip through.

use crate::domain::entities::{Event, Ticket, TicketListing, TicketTransfer, User};
use crate::domain::value_objects::{
    EmailAddress, EventId, ListingId, ListingStatus, Money, TicketId, TransferId, TransferToken,
    UserId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row required by the mutation does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"ticket"`.
        entity: &'static str,
        /// The missing row's identifier.
        id: String,
    },

    /// A guarded mutation found the row in a different status than the one
    /// it departs from. Nothing was written.
    #[error("{0}")]
    PreconditionFailed(String),

    /// Database connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("query error: {0}")]
    Query(String),
}

impl StoreError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a precondition failure.
    #[must_use]
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl fmt::Display) -> Self {
        Self::Connection(msg.to_string())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl fmt::Display) -> Self {
        Self::Query(msg.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Filter for listing searches. Results are always newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Restrict to one event.
    pub event_id: Option<EventId>,
    /// Lowest asking price to include, in minor units.
    pub min_price: Option<Money>,
    /// Highest asking price to include, in minor units.
    pub max_price: Option<Money>,
    /// Status to match. Browsing defaults to `Active`.
    pub status: ListingStatus,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            event_id: None,
            min_price: None,
            max_price: None,
            status: ListingStatus::Active,
        }
    }
}

impl ListingQuery {
    /// Returns true if `listing` matches every set filter field.
    #[must_use]
    pub fn matches(&self, listing: &TicketListing) -> bool {
        if listing.status() != self.status {
            return false;
        }
        if let Some(event_id) = self.event_id
            && listing.event_id() != event_id
        {
            return false;
        }
        if let Some(min) = self.min_price
            && listing.price() < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && listing.price() > max
        {
            return false;
        }
        true
    }
}

/// Port for marketplace persistence.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` for use in async contexts.
#[async_trait]
pub trait MarketplaceStore: Send + Sync + fmt::Debug {
    // ========== Point Lookups ==========

    /// Finds a ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn ticket(&self, id: TicketId) -> StoreResult<Option<Ticket>>;

    /// Finds a listing by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn listing(&self, id: ListingId) -> StoreResult<Option<TicketListing>>;

    /// Finds a transfer by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn transfer(&self, id: TransferId) -> StoreResult<Option<TicketTransfer>>;

    /// Finds a transfer by its claim token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn transfer_by_token(&self, token: &TransferToken)
    -> StoreResult<Option<TicketTransfer>>;

    /// Finds an event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn event(&self, id: EventId) -> StoreResult<Option<Event>>;

    /// Finds the at-most-one `Active` listing encumbering a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn active_listing_for_ticket(
        &self,
        ticket_id: TicketId,
    ) -> StoreResult<Option<TicketListing>>;

    /// Finds the at-most-one `Pending` transfer encumbering a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn pending_transfer_for_ticket(
        &self,
        ticket_id: TicketId,
    ) -> StoreResult<Option<TicketTransfer>>;

    // ========== Queries ==========

    /// Finds listings matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn find_listings(&self, query: &ListingQuery) -> StoreResult<Vec<TicketListing>>;

    /// Finds all of a seller's listings regardless of status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn listings_by_seller(&self, seller_id: UserId) -> StoreResult<Vec<TicketListing>>;

    /// Finds all transfers initiated by `sender_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn transfers_by_sender(&self, sender_id: UserId) -> StoreResult<Vec<TicketTransfer>>;

    /// Finds all transfers addressed to `email`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn transfers_by_recipient_email(
        &self,
        email: &EmailAddress,
    ) -> StoreResult<Vec<TicketTransfer>>;

    // ========== Composite Mutations ==========

    /// Inserts a new listing and moves its ticket to `ListedForSale`, as
    /// one atomic write. Guard: the stored ticket is still `Valid`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PreconditionFailed`] when the guard fails,
    /// or another error if the write fails.
    async fn create_listing(&self, listing: &TicketListing, ticket: &Ticket) -> StoreResult<()>;

    /// Updates an active listing's price. Guard: the stored listing is
    /// still `Active`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PreconditionFailed`] when the guard fails,
    /// or another error if the write fails.
    async fn reprice_listing(&self, listing: &TicketListing) -> StoreResult<()>;

    /// Moves a listing to `Cancelled` or `Expired` and its ticket back to
    /// `Valid`, as one atomic write. Guards: stored listing `Active`,
    /// stored ticket `ListedForSale`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PreconditionFailed`] when a guard fails,
    /// or another error if the write fails.
    async fn close_listing(&self, listing: &TicketListing, ticket: &Ticket) -> StoreResult<()>;

    /// Moves a listing to `Sold` and hands its ticket to the buyer, as one
    /// atomic write. Guards: stored listing `Active`, stored ticket
    /// `ListedForSale`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PreconditionFailed`] when a guard fails,
    /// or another error if the write fails.
    async fn settle_listing(&self, listing: &TicketListing, ticket: &Ticket) -> StoreResult<()>;

    /// Inserts a new transfer and moves its ticket to `PendingTransfer`,
    /// as one atomic write. Guard: the stored ticket is still `Valid`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PreconditionFailed`] when the guard fails,
    /// or another error if the write fails.
    async fn create_transfer(&self, transfer: &TicketTransfer, ticket: &Ticket)
    -> StoreResult<()>;

    /// Moves a transfer to `Accepted` and hands its ticket to the
    /// receiver, as one atomic write. Guards: stored transfer `Pending`,
    /// stored ticket `PendingTransfer`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PreconditionFailed`] when a guard fails,
    /// or another error if the write fails.
    async fn accept_transfer(&self, transfer: &TicketTransfer, ticket: &Ticket)
    -> StoreResult<()>;

    /// Moves a transfer to `Rejected`, `Cancelled`, or `Expired` and its
    /// ticket back to `Valid`, as one atomic write. Guards: stored
    /// transfer `Pending`, stored ticket `PendingTransfer`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PreconditionFailed`] when a guard fails,
    /// or another error if the write fails.
    async fn close_transfer(&self, transfer: &TicketTransfer, ticket: &Ticket)
    -> StoreResult<()>;

    // ========== Seeding ==========

    /// Inserts a ticket row. Used by upstream writers and test setup.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn insert_ticket(&self, ticket: &Ticket) -> StoreResult<()>;

    /// Inserts an event row. Used by upstream writers and test setup.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn insert_event(&self, event: &Event) -> StoreResult<()>;
}

/// Port for looking up accounts in the identity service.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` for use in async contexts.
#[async_trait]
pub trait UserDirectory: Send + Sync + fmt::Debug {
    /// Finds a user by account ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Finds a user by normalized email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    async fn find_by_email(&self, email: &EmailAddress) -> StoreResult<Option<User>>;
}
