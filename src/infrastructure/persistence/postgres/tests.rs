//! # PostgreSQL Store Integration Tests
//!
//! Integration tests for the PostgreSQL marketplace store and user
//! directory.
//!
//! # Test Categories
//!
//! - **Round trips**: entity fields survive the row mapping
//! - **Composite mutations**: both rows move, or neither does
//! - **Guards**: stale writes fail with `PreconditionFailed`
//! - **Queries**: filters and newest-first ordering
//!
//! # Note
//!
//! These tests require a reachable PostgreSQL instance. They are marked
//! with `#[ignore]` by default and can be run with:
//! ```bash
//! TEST_DATABASE_URL=postgres://... cargo test --lib postgres::tests -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use sqlx::PgPool;

use crate::domain::entities::{Event, Ticket, TicketListing, TicketTransfer};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    EmailAddress, EventId, ListingStatus, Money, TicketStatus, TierId, TransferStatus, UserId,
};
use crate::infrastructure::persistence::postgres::{
    PostgresMarketplaceStore, PostgresUserDirectory,
};
use crate::infrastructure::persistence::traits::{
    ListingQuery, MarketplaceStore, StoreError, UserDirectory,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates a test database pool.
///
/// Requires a running PostgreSQL instance reachable through the
/// `TEST_DATABASE_URL` environment variable.
async fn create_test_pool() -> Option<PgPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

    PgPool::connect(&database_url).await.ok()
}

/// Creates the required database tables for testing.
async fn setup_tables(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            status VARCHAR(50) NOT NULL,
            start_time TIMESTAMPTZ NOT NULL,
            allow_resale BOOLEAN NOT NULL,
            resale_cap_type VARCHAR(50),
            resale_cap_value BIGINT,
            custom_resale_cap BIGINT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tickets (
            id UUID PRIMARY KEY,
            event_id UUID NOT NULL,
            tier_id UUID NOT NULL,
            current_owner_id UUID NOT NULL,
            status VARCHAR(50) NOT NULL,
            face_value BIGINT NOT NULL,
            price_paid BIGINT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS listings (
            id UUID PRIMARY KEY,
            ticket_id UUID NOT NULL,
            event_id UUID NOT NULL,
            seller_id UUID NOT NULL,
            buyer_id UUID,
            price BIGINT NOT NULL,
            status VARCHAR(50) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL,
            sold_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS one_active_listing_per_ticket
        ON listings (ticket_id) WHERE status = 'ACTIVE'
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transfers (
            id UUID PRIMARY KEY,
            ticket_id UUID NOT NULL,
            sender_id UUID NOT NULL,
            receiver_id UUID,
            recipient_email TEXT NOT NULL,
            token TEXT NOT NULL UNIQUE,
            message TEXT,
            status VARCHAR(50) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL,
            accepted_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS one_pending_transfer_per_ticket
        ON transfers (ticket_id) WHERE status = 'PENDING'
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Cleans up test data between tests.
async fn cleanup_tables(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM transfers").execute(pool).await?;
    sqlx::query("DELETE FROM listings").execute(pool).await?;
    sqlx::query("DELETE FROM tickets").execute(pool).await?;
    sqlx::query("DELETE FROM events").execute(pool).await?;
    sqlx::query("DELETE FROM users").execute(pool).await?;
    Ok(())
}

/// Creates a test event a month out with resale allowed.
fn create_test_event() -> Event {
    Event::new("Warehouse Show", Timestamp::now().add_days(30))
}

/// Creates a valid test ticket for `event_id` held by `owner`.
fn create_test_ticket(event_id: EventId, owner: UserId) -> Ticket {
    Ticket::new(
        event_id,
        TierId::new_v4(),
        owner,
        Money::from_minor(10_000).unwrap(),
        Money::from_minor(10_800).unwrap(),
    )
}

/// Creates an active test listing for `ticket` at `price` minor units.
fn create_test_listing(ticket: &Ticket, price: i64, created_at: Timestamp) -> TicketListing {
    TicketListing::new(
        ticket.id(),
        ticket.event_id(),
        ticket.current_owner_id(),
        Money::from_minor(price).unwrap(),
        created_at,
        created_at.add_days(30),
    )
}

/// Creates a pending test transfer for `ticket`.
fn create_test_transfer(ticket: &Ticket, created_at: Timestamp) -> TicketTransfer {
    TicketTransfer::new(
        ticket.id(),
        ticket.current_owner_id(),
        EmailAddress::new("recipient@example.com").unwrap(),
        None,
        Some("see you there".to_string()),
        created_at,
        created_at.add_days(7),
    )
}

/// Seeds a ticket with an active listing and returns all three entities.
async fn seed_listed(store: &PostgresMarketplaceStore) -> (Event, Ticket, TicketListing) {
    let now = Timestamp::now();
    let event = create_test_event();
    let mut ticket = create_test_ticket(event.id(), UserId::new_v4());
    store.insert_event(&event).await.unwrap();
    store.insert_ticket(&ticket).await.unwrap();

    let listing = create_test_listing(&ticket, 11_000, now);
    ticket.mark_listed(now).unwrap();
    store.create_listing(&listing, &ticket).await.unwrap();

    (event, ticket, listing)
}

// ============================================================================
// Marketplace Store Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn marketplace_store_ticket_round_trip() {
    let pool = match create_test_pool().await {
        Some(p) => p,
        None => {
            eprintln!("Skipping test: TEST_DATABASE_URL not set");
            return;
        }
    };

    setup_tables(&pool).await.unwrap();
    cleanup_tables(&pool).await.unwrap();

    let store = PostgresMarketplaceStore::new(pool.clone());
    let event = create_test_event();
    let ticket = create_test_ticket(event.id(), UserId::new_v4());

    store.insert_event(&event).await.unwrap();
    store.insert_ticket(&ticket).await.unwrap();

    let stored = store.ticket(ticket.id()).await.unwrap().unwrap();
    assert_eq!(stored.id(), ticket.id());
    assert_eq!(stored.event_id(), event.id());
    assert_eq!(stored.current_owner_id(), ticket.current_owner_id());
    assert_eq!(stored.status(), TicketStatus::Valid);
    assert_eq!(stored.face_value(), ticket.face_value());
    assert_eq!(stored.price_paid(), ticket.price_paid());

    let stored = store.event(event.id()).await.unwrap().unwrap();
    assert_eq!(stored.id(), event.id());
    assert_eq!(stored.name(), event.name());
    assert!(stored.allows_resale());

    cleanup_tables(&pool).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn marketplace_store_create_listing_writes_both_rows() {
    let pool = match create_test_pool().await {
        Some(p) => p,
        None => return,
    };

    setup_tables(&pool).await.unwrap();
    cleanup_tables(&pool).await.unwrap();

    let store = PostgresMarketplaceStore::new(pool.clone());
    let (_, ticket, listing) = seed_listed(&store).await;

    let stored = store.listing(listing.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), ListingStatus::Active);
    assert_eq!(stored.price(), listing.price());

    let stored = store.ticket(ticket.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), TicketStatus::ListedForSale);

    let active = store
        .active_listing_for_ticket(ticket.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id(), listing.id());

    cleanup_tables(&pool).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn marketplace_store_guard_failure_rolls_back() {
    let pool = match create_test_pool().await {
        Some(p) => p,
        None => return,
    };

    setup_tables(&pool).await.unwrap();
    cleanup_tables(&pool).await.unwrap();

    let store = PostgresMarketplaceStore::new(pool.clone());
    let now = Timestamp::now();
    let event = create_test_event();
    let mut ticket = create_test_ticket(event.id(), UserId::new_v4());
    store.insert_event(&event).await.unwrap();

    // The stored row is already encumbered.
    ticket.mark_listed(now).unwrap();
    store.insert_ticket(&ticket).await.unwrap();

    // A writer that believed the ticket was still free loses.
    let listing = create_test_listing(&ticket, 11_000, now);
    let err = store.create_listing(&listing, &ticket).await.unwrap_err();
    assert!(matches!(err, StoreError::PreconditionFailed(_)));
    assert!(err.to_string().contains("expected VALID"));

    // The transaction rolled back, so the listing row never landed.
    assert!(store.listing(listing.id()).await.unwrap().is_none());

    cleanup_tables(&pool).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn marketplace_store_settle_listing_hands_over_the_ticket() {
    let pool = match create_test_pool().await {
        Some(p) => p,
        None => return,
    };

    setup_tables(&pool).await.unwrap();
    cleanup_tables(&pool).await.unwrap();

    let store = PostgresMarketplaceStore::new(pool.clone());
    let (_, mut ticket, mut listing) = seed_listed(&store).await;

    let buyer = UserId::new_v4();
    let now = Timestamp::now();
    listing.sell(buyer, now).unwrap();
    ticket.hand_over(buyer, now).unwrap();
    store.settle_listing(&listing, &ticket).await.unwrap();

    let stored = store.listing(listing.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), ListingStatus::Sold);
    assert_eq!(stored.buyer_id(), Some(buyer));
    assert!(stored.sold_at().is_some());

    let stored = store.ticket(ticket.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), TicketStatus::Valid);
    assert_eq!(stored.current_owner_id(), buyer);

    // A second settlement attempt finds the listing already moved on.
    let err = store.settle_listing(&listing, &ticket).await.unwrap_err();
    assert!(matches!(err, StoreError::PreconditionFailed(_)));

    cleanup_tables(&pool).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn marketplace_store_reprice_requires_an_active_row() {
    let pool = match create_test_pool().await {
        Some(p) => p,
        None => return,
    };

    setup_tables(&pool).await.unwrap();
    cleanup_tables(&pool).await.unwrap();

    let store = PostgresMarketplaceStore::new(pool.clone());
    let (_, mut ticket, mut listing) = seed_listed(&store).await;

    let now = Timestamp::now();
    listing
        .reprice(Money::from_minor(9_500).unwrap(), now)
        .unwrap();
    store.reprice_listing(&listing).await.unwrap();

    let stored = store.listing(listing.id()).await.unwrap().unwrap();
    assert_eq!(stored.price(), Money::from_minor(9_500).unwrap());

    // Close the listing, then reprice against the stale entity.
    let mut closed = stored.clone();
    closed.cancel(now).unwrap();
    ticket.release(now).unwrap();
    store.close_listing(&closed, &ticket).await.unwrap();

    let err = store.reprice_listing(&listing).await.unwrap_err();
    assert!(matches!(err, StoreError::PreconditionFailed(_)));
    assert!(err.to_string().contains("expected ACTIVE"));

    cleanup_tables(&pool).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn marketplace_store_find_listings_filters_and_orders() {
    let pool = match create_test_pool().await {
        Some(p) => p,
        None => return,
    };

    setup_tables(&pool).await.unwrap();
    cleanup_tables(&pool).await.unwrap();

    let store = PostgresMarketplaceStore::new(pool.clone());
    let base = Timestamp::now();
    let event = create_test_event();
    store.insert_event(&event).await.unwrap();

    // Three listings with distinct prices and creation times.
    for (offset, price) in [(0, 8_000), (60, 11_000), (120, 14_000)] {
        let mut ticket = create_test_ticket(event.id(), UserId::new_v4());
        store.insert_ticket(&ticket).await.unwrap();
        let at = base.add_secs(offset);
        let listing = create_test_listing(&ticket, price, at);
        ticket.mark_listed(at).unwrap();
        store.create_listing(&listing, &ticket).await.unwrap();
    }

    let all = store.find_listings(&ListingQuery::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    // Newest first.
    assert_eq!(all[0].price(), Money::from_minor(14_000).unwrap());
    assert_eq!(all[2].price(), Money::from_minor(8_000).unwrap());

    let query = ListingQuery {
        event_id: Some(event.id()),
        min_price: Some(Money::from_minor(9_000).unwrap()),
        max_price: Some(Money::from_minor(12_000).unwrap()),
        status: ListingStatus::Active,
    };
    let band = store.find_listings(&query).await.unwrap();
    assert_eq!(band.len(), 1);
    assert_eq!(band[0].price(), Money::from_minor(11_000).unwrap());

    cleanup_tables(&pool).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn marketplace_store_transfer_round_trip() {
    let pool = match create_test_pool().await {
        Some(p) => p,
        None => return,
    };

    setup_tables(&pool).await.unwrap();
    cleanup_tables(&pool).await.unwrap();

    let store = PostgresMarketplaceStore::new(pool.clone());
    let now = Timestamp::now();
    let event = create_test_event();
    let mut ticket = create_test_ticket(event.id(), UserId::new_v4());
    store.insert_event(&event).await.unwrap();
    store.insert_ticket(&ticket).await.unwrap();

    let mut transfer = create_test_transfer(&ticket, now);
    ticket.mark_pending_transfer(now).unwrap();
    store.create_transfer(&transfer, &ticket).await.unwrap();

    let stored = store
        .transfer_by_token(transfer.token())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id(), transfer.id());
    assert_eq!(stored.message(), Some("see you there"));
    assert_eq!(stored.recipient_email(), transfer.recipient_email());

    let pending = store
        .pending_transfer_for_ticket(ticket.id())
        .await
        .unwrap();
    assert!(pending.is_some());

    // Accept and verify both rows moved.
    let receiver = UserId::new_v4();
    transfer.accept(receiver, now).unwrap();
    ticket.hand_over(receiver, now).unwrap();
    store.accept_transfer(&transfer, &ticket).await.unwrap();

    let stored = store.transfer(transfer.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), TransferStatus::Accepted);
    assert_eq!(stored.receiver_id(), Some(receiver));
    assert!(stored.accepted_at().is_some());

    let stored = store.ticket(ticket.id()).await.unwrap().unwrap();
    assert_eq!(stored.current_owner_id(), receiver);
    assert!(
        store
            .pending_transfer_for_ticket(ticket.id())
            .await
            .unwrap()
            .is_none()
    );

    cleanup_tables(&pool).await.unwrap();
}

// ============================================================================
// User Directory Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn user_directory_finds_by_id_and_email() {
    let pool = match create_test_pool().await {
        Some(p) => p,
        None => return,
    };

    setup_tables(&pool).await.unwrap();
    cleanup_tables(&pool).await.unwrap();

    let id = UserId::new_v4();
    sqlx::query("INSERT INTO users (id, email, name) VALUES ($1, $2, $3)")
        .bind(id.get())
        .bind("maria@example.com")
        .bind("Maria")
        .execute(&pool)
        .await
        .unwrap();

    let directory = PostgresUserDirectory::new(pool.clone());

    let user = directory.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(user.name(), "Maria");

    let email = EmailAddress::new("maria@example.com").unwrap();
    let user = directory.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(user.id(), id);

    let unknown = EmailAddress::new("nobody@example.com").unwrap();
    assert!(directory.find_by_email(&unknown).await.unwrap().is_none());

    cleanup_tables(&pool).await.unwrap();
}

// ============================================================================
// Helper Tests (run without database)
// ============================================================================

#[test]
fn test_ticket_helper_starts_valid() {
    let event = create_test_event();
    let ticket = create_test_ticket(event.id(), UserId::new_v4());

    assert_eq!(ticket.status(), TicketStatus::Valid);
    assert!(ticket.is_sellable());
}

#[test]
fn test_listing_helper_expiry_window() {
    let event = create_test_event();
    let ticket = create_test_ticket(event.id(), UserId::new_v4());
    let now = Timestamp::now();
    let listing = create_test_listing(&ticket, 11_000, now);

    assert_eq!(listing.status(), ListingStatus::Active);
    assert!(listing.expires_at().is_after(now));
    assert!(!listing.is_past_deadline(now));
}
