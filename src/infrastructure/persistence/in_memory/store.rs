//! # In-Memory Marketplace Store
//!
//! In-memory implementation of [`MarketplaceStore`] for tests and local
//! development.
//!
//! All tables sit behind a single `RwLock`, so a composite mutation holds
//! the write guard while it checks its preconditions and applies both row
//! updates. That gives the same all-or-nothing behavior the PostgreSQL
//! implementation gets from transactions.
//!
//! # Examples
//!
//! ```
//! use boxoffice::infrastructure::persistence::in_memory::InMemoryMarketplaceStore;
//!
//! let store = InMemoryMarketplaceStore::new();
//! assert!(store.is_empty());
//! ```

use crate::domain::entities::{Event, Ticket, TicketListing, TicketTransfer};
use crate::domain::value_objects::{
    EmailAddress, EventId, ListingId, ListingStatus, TicketId, TicketStatus, TransferId,
    TransferStatus, TransferToken, UserId,
};
use crate::infrastructure::persistence::traits::{
    ListingQuery, MarketplaceStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    tickets: HashMap<TicketId, Ticket>,
    listings: HashMap<ListingId, TicketListing>,
    transfers: HashMap<TransferId, TicketTransfer>,
    events: HashMap<EventId, Event>,
}

fn guard_ticket(tables: &Tables, id: TicketId, expected: TicketStatus) -> StoreResult<()> {
    let stored = tables
        .tickets
        .get(&id)
        .ok_or_else(|| StoreError::not_found("ticket", id))?;
    if stored.status() != expected {
        return Err(StoreError::precondition_failed(format!(
            "ticket {id} is {}, expected {expected}",
            stored.status()
        )));
    }
    Ok(())
}

fn guard_listing(tables: &Tables, id: ListingId, expected: ListingStatus) -> StoreResult<()> {
    let stored = tables
        .listings
        .get(&id)
        .ok_or_else(|| StoreError::not_found("listing", id))?;
    if stored.status() != expected {
        return Err(StoreError::precondition_failed(format!(
            "listing {id} is {}, expected {expected}",
            stored.status()
        )));
    }
    Ok(())
}

fn guard_transfer(tables: &Tables, id: TransferId, expected: TransferStatus) -> StoreResult<()> {
    let stored = tables
        .transfers
        .get(&id)
        .ok_or_else(|| StoreError::not_found("transfer", id))?;
    if stored.status() != expected {
        return Err(StoreError::precondition_failed(format!(
            "transfer {id} is {}, expected {expected}",
            stored.status()
        )));
    }
    Ok(())
}

/// In-memory implementation of [`MarketplaceStore`].
///
/// Suitable for unit tests and local development without a database.
///
/// # Thread Safety
///
/// All tables share one `Arc<RwLock<..>>`; clones see the same data.
///
/// # Examples
///
/// ```
/// use boxoffice::infrastructure::persistence::in_memory::InMemoryMarketplaceStore;
///
/// let store = InMemoryMarketplaceStore::new();
/// assert_eq!(store.listing_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryMarketplaceStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryMarketplaceStore {
    /// Creates a new store with empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
        }
    }

    /// Returns the number of listings across all statuses.
    #[must_use]
    pub fn listing_count(&self) -> usize {
        // Use try_read to avoid blocking in sync context
        self.tables
            .try_read()
            .map(|tables| tables.listings.len())
            .unwrap_or(0)
    }

    /// Returns the number of transfers across all statuses.
    #[must_use]
    pub fn transfer_count(&self) -> usize {
        self.tables
            .try_read()
            .map(|tables| tables.transfers.len())
            .unwrap_or(0)
    }

    /// Returns true if every table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables
            .try_read()
            .map(|tables| {
                tables.tickets.is_empty()
                    && tables.listings.is_empty()
                    && tables.transfers.is_empty()
                    && tables.events.is_empty()
            })
            .unwrap_or(true)
    }

    /// Clears every table.
    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        *tables = Tables::default();
    }

    /// Writes a listing/ticket pair leaving the active-listing state.
    /// Guards: stored listing `Active`, stored ticket `ListedForSale`.
    async fn depart_active_listing(
        &self,
        listing: &TicketListing,
        ticket: &Ticket,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        guard_listing(&tables, listing.id(), ListingStatus::Active)?;
        guard_ticket(&tables, ticket.id(), TicketStatus::ListedForSale)?;
        tables.listings.insert(listing.id(), listing.clone());
        tables.tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    /// Writes a transfer/ticket pair leaving the pending-transfer state.
    /// Guards: stored transfer `Pending`, stored ticket `PendingTransfer`.
    async fn depart_pending_transfer(
        &self,
        transfer: &TicketTransfer,
        ticket: &Ticket,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        guard_transfer(&tables, transfer.id(), TransferStatus::Pending)?;
        guard_ticket(&tables, ticket.id(), TicketStatus::PendingTransfer)?;
        tables.transfers.insert(transfer.id(), transfer.clone());
        tables.tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }
}

impl Default for InMemoryMarketplaceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketplaceStore for InMemoryMarketplaceStore {
    async fn ticket(&self, id: TicketId) -> StoreResult<Option<Ticket>> {
        let tables = self.tables.read().await;
        Ok(tables.tickets.get(&id).cloned())
    }

    async fn listing(&self, id: ListingId) -> StoreResult<Option<TicketListing>> {
        let tables = self.tables.read().await;
        Ok(tables.listings.get(&id).cloned())
    }

    async fn transfer(&self, id: TransferId) -> StoreResult<Option<TicketTransfer>> {
        let tables = self.tables.read().await;
        Ok(tables.transfers.get(&id).cloned())
    }

    async fn transfer_by_token(
        &self,
        token: &TransferToken,
    ) -> StoreResult<Option<TicketTransfer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .transfers
            .values()
            .find(|transfer| transfer.token() == token)
            .cloned())
    }

    async fn event(&self, id: EventId) -> StoreResult<Option<Event>> {
        let tables = self.tables.read().await;
        Ok(tables.events.get(&id).cloned())
    }

    async fn active_listing_for_ticket(
        &self,
        ticket_id: TicketId,
    ) -> StoreResult<Option<TicketListing>> {
        let tables = self.tables.read().await;
        Ok(tables
            .listings
            .values()
            .find(|listing| listing.ticket_id() == ticket_id && listing.is_active())
            .cloned())
    }

    async fn pending_transfer_for_ticket(
        &self,
        ticket_id: TicketId,
    ) -> StoreResult<Option<TicketTransfer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .transfers
            .values()
            .find(|transfer| transfer.ticket_id() == ticket_id && transfer.is_pending())
            .cloned())
    }

    async fn find_listings(&self, query: &ListingQuery) -> StoreResult<Vec<TicketListing>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<TicketListing> = tables
            .listings
            .values()
            .filter(|listing| query.matches(listing))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(rows)
    }

    async fn listings_by_seller(&self, seller_id: UserId) -> StoreResult<Vec<TicketListing>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<TicketListing> = tables
            .listings
            .values()
            .filter(|listing| listing.seller_id() == seller_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(rows)
    }

    async fn transfers_by_sender(&self, sender_id: UserId) -> StoreResult<Vec<TicketTransfer>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<TicketTransfer> = tables
            .transfers
            .values()
            .filter(|transfer| transfer.is_sent_by(sender_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(rows)
    }

    async fn transfers_by_recipient_email(
        &self,
        email: &EmailAddress,
    ) -> StoreResult<Vec<TicketTransfer>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<TicketTransfer> = tables
            .transfers
            .values()
            .filter(|transfer| transfer.is_addressed_to(email))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(rows)
    }

    async fn create_listing(&self, listing: &TicketListing, ticket: &Ticket) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        guard_ticket(&tables, ticket.id(), TicketStatus::Valid)?;
        tables.listings.insert(listing.id(), listing.clone());
        tables.tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    async fn reprice_listing(&self, listing: &TicketListing) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        guard_listing(&tables, listing.id(), ListingStatus::Active)?;
        tables.listings.insert(listing.id(), listing.clone());
        Ok(())
    }

    async fn close_listing(&self, listing: &TicketListing, ticket: &Ticket) -> StoreResult<()> {
        self.depart_active_listing(listing, ticket).await
    }

    async fn settle_listing(&self, listing: &TicketListing, ticket: &Ticket) -> StoreResult<()> {
        self.depart_active_listing(listing, ticket).await
    }

    async fn create_transfer(
        &self,
        transfer: &TicketTransfer,
        ticket: &Ticket,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        guard_ticket(&tables, ticket.id(), TicketStatus::Valid)?;
        tables.transfers.insert(transfer.id(), transfer.clone());
        tables.tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    async fn accept_transfer(
        &self,
        transfer: &TicketTransfer,
        ticket: &Ticket,
    ) -> StoreResult<()> {
        self.depart_pending_transfer(transfer, ticket).await
    }

    async fn close_transfer(
        &self,
        transfer: &TicketTransfer,
        ticket: &Ticket,
    ) -> StoreResult<()> {
        self.depart_pending_transfer(transfer, ticket).await
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.events.insert(event.id(), event.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::timestamp::Timestamp;
    use crate::domain::value_objects::{Money, TierId};

    fn ticket(owner: UserId) -> Ticket {
        Ticket::new(
            EventId::new_v4(),
            TierId::new_v4(),
            owner,
            Money::from_minor(10_000).unwrap(),
            Money::from_minor(10_800).unwrap(),
        )
    }

    fn listing_for(ticket: &Ticket, at: Timestamp) -> TicketListing {
        TicketListing::new(
            ticket.id(),
            ticket.event_id(),
            ticket.current_owner_id(),
            Money::from_minor(11_000).unwrap(),
            at,
            at.add_days(30),
        )
    }

    fn transfer_for(ticket: &Ticket, at: Timestamp) -> TicketTransfer {
        TicketTransfer::new(
            ticket.id(),
            ticket.current_owner_id(),
            EmailAddress::new("recipient@example.com").unwrap(),
            None,
            None,
            at,
            at.add_days(7),
        )
    }

    /// Seeds a ticket and an open listing on it, returning both as stored.
    async fn seed_listed(store: &InMemoryMarketplaceStore) -> (Ticket, TicketListing) {
        let now = Timestamp::now();
        let mut ticket = ticket(UserId::new_v4());
        store.insert_ticket(&ticket).await.unwrap();

        let listing = listing_for(&ticket, now);
        ticket.mark_listed(now).unwrap();
        store.create_listing(&listing, &ticket).await.unwrap();
        (ticket, listing)
    }

    #[tokio::test]
    async fn new_store_is_empty() {
        let store = InMemoryMarketplaceStore::new();
        assert!(store.is_empty());
        assert_eq!(store.listing_count(), 0);
        assert_eq!(store.transfer_count(), 0);
    }

    #[tokio::test]
    async fn create_listing_writes_both_rows() {
        let store = InMemoryMarketplaceStore::new();
        let (ticket, listing) = seed_listed(&store).await;

        let stored_ticket = store.ticket(ticket.id()).await.unwrap().unwrap();
        assert_eq!(stored_ticket.status(), TicketStatus::ListedForSale);

        let found = store
            .active_listing_for_ticket(ticket.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), listing.id());
    }

    #[tokio::test]
    async fn create_listing_guard_rejects_encumbered_ticket() {
        let store = InMemoryMarketplaceStore::new();
        let (ticket, _) = seed_listed(&store).await;

        let rival = listing_for(&ticket, Timestamp::now());
        let err = store.create_listing(&rival, &ticket).await.unwrap_err();
        assert!(matches!(err, StoreError::PreconditionFailed(_)));
        assert_eq!(store.listing_count(), 1);
    }

    #[tokio::test]
    async fn close_listing_requires_an_active_row() {
        let store = InMemoryMarketplaceStore::new();
        let (mut ticket, mut listing) = seed_listed(&store).await;
        let now = Timestamp::now();

        listing.cancel(now).unwrap();
        ticket.release(now).unwrap();
        store.close_listing(&listing, &ticket).await.unwrap();

        // The stored row is no longer Active, so a second close must fail.
        let err = store.close_listing(&listing, &ticket).await.unwrap_err();
        assert!(matches!(err, StoreError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn failed_guard_writes_nothing() {
        let store = InMemoryMarketplaceStore::new();
        let (mut ticket, mut listing) = seed_listed(&store).await;
        let now = Timestamp::now();

        // Settle out from under the close.
        let buyer = UserId::new_v4();
        let mut sold = listing.clone();
        let mut handed = ticket.clone();
        sold.sell(buyer, now).unwrap();
        handed.hand_over(buyer, now).unwrap();
        store.settle_listing(&sold, &handed).await.unwrap();

        listing.cancel(now).unwrap();
        ticket.release(now).unwrap();
        assert!(store.close_listing(&listing, &ticket).await.is_err());

        let stored = store.listing(listing.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), ListingStatus::Sold);
        let stored = store.ticket(ticket.id()).await.unwrap().unwrap();
        assert_eq!(stored.current_owner_id(), buyer);
    }

    #[tokio::test]
    async fn find_listings_returns_newest_first() {
        let store = InMemoryMarketplaceStore::new();
        let base = Timestamp::now();
        let event_id = EventId::new_v4();

        let mut ids = Vec::new();
        for offset in [0, 60, 120] {
            let mut t = ticket(UserId::new_v4());
            store.insert_ticket(&t).await.unwrap();
            let listing = TicketListing::new(
                t.id(),
                event_id,
                t.current_owner_id(),
                Money::from_minor(11_000).unwrap(),
                base.add_secs(offset),
                base.add_days(30),
            );
            t.mark_listed(base.add_secs(offset)).unwrap();
            store.create_listing(&listing, &t).await.unwrap();
            ids.push(listing.id());
        }

        let query = ListingQuery {
            event_id: Some(event_id),
            ..ListingQuery::default()
        };
        let found = store.find_listings(&query).await.unwrap();
        let found_ids: Vec<ListingId> = found.iter().map(TicketListing::id).collect();
        assert_eq!(found_ids, vec![ids[2], ids[1], ids[0]]);
    }

    #[tokio::test]
    async fn transfer_round_trip_by_token_and_ticket() {
        let store = InMemoryMarketplaceStore::new();
        let now = Timestamp::now();
        let mut ticket = ticket(UserId::new_v4());
        store.insert_ticket(&ticket).await.unwrap();

        let transfer = transfer_for(&ticket, now);
        ticket.mark_pending_transfer(now).unwrap();
        store.create_transfer(&transfer, &ticket).await.unwrap();

        let by_token = store
            .transfer_by_token(transfer.token())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_token.id(), transfer.id());

        let pending = store
            .pending_transfer_for_ticket(ticket.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.id(), transfer.id());
    }

    #[tokio::test]
    async fn accept_transfer_hands_the_ticket_over() {
        let store = InMemoryMarketplaceStore::new();
        let now = Timestamp::now();
        let mut ticket = ticket(UserId::new_v4());
        store.insert_ticket(&ticket).await.unwrap();

        let mut transfer = transfer_for(&ticket, now);
        ticket.mark_pending_transfer(now).unwrap();
        store.create_transfer(&transfer, &ticket).await.unwrap();

        let receiver = UserId::new_v4();
        transfer.accept(receiver, now).unwrap();
        ticket.hand_over(receiver, now).unwrap();
        store.accept_transfer(&transfer, &ticket).await.unwrap();

        let stored = store.ticket(ticket.id()).await.unwrap().unwrap();
        assert_eq!(stored.current_owner_id(), receiver);
        assert_eq!(stored.status(), TicketStatus::Valid);
        assert!(
            store
                .pending_transfer_for_ticket(ticket.id())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn clones_share_the_same_tables() {
        let store = InMemoryMarketplaceStore::new();
        let clone = store.clone();
        seed_listed(&store).await;

        assert_eq!(clone.listing_count(), 1);
        clone.clear().await;
        assert!(store.is_empty());
    }
}
