//! # PostgreSQL Marketplace Store
//!
//! PostgreSQL implementation of [`MarketplaceStore`] using sqlx.
//!
//! Every composite mutation runs in a transaction. Status guards are
//! expressed as `WHERE status = <prior>` clauses on the UPDATE itself;
//! a zero row count means the guard failed, and a follow-up SELECT
//! distinguishes a missing row from a row that moved on.

use crate::domain::entities::{Event, Ticket, TicketListing, TicketTransfer};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    EmailAddress, EventId, EventStatus, ListingId, ListingStatus, Money, ResaleCapType, TicketId,
    TicketStatus, TierId, TransferId, TransferStatus, TransferToken, UserId,
};
use crate::infrastructure::persistence::traits::{
    ListingQuery, MarketplaceStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// PostgreSQL implementation of [`MarketplaceStore`].
///
/// Uses connection pooling via `sqlx::PgPool`. Rows are keyed by UUID and
/// carry their status as text, matching the domain enums' canonical string
/// forms.
///
/// # Examples
///
/// ```ignore
/// use sqlx::PgPool;
/// use boxoffice::infrastructure::persistence::postgres::PostgresMarketplaceStore;
///
/// let pool = PgPool::connect("postgres://...").await?;
/// let store = PostgresMarketplaceStore::new(pool);
/// ```
#[derive(Debug, Clone)]
pub struct PostgresMarketplaceStore {
    pool: PgPool,
}

impl PostgresMarketplaceStore {
    /// Creates a new PostgreSQL marketplace store.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Closes an `Active` listing row and returns its ticket to `Valid`,
    /// all-or-nothing. Shared by cancel, expiry, and settlement, which
    /// differ only in the status and buyer fields already set on the
    /// passed entities.
    async fn depart_active_listing(
        &self,
        listing: &TicketListing,
        ticket: &Ticket,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::connection)?;
        move_listing(&mut tx, listing, ListingStatus::Active).await?;
        move_ticket(&mut tx, ticket, TicketStatus::ListedForSale).await?;
        tx.commit().await.map_err(StoreError::query)?;
        Ok(())
    }

    /// Resolves a `Pending` transfer row and moves its ticket out of
    /// `PendingTransfer`, all-or-nothing.
    async fn depart_pending_transfer(
        &self,
        transfer: &TicketTransfer,
        ticket: &Ticket,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::connection)?;
        move_transfer(&mut tx, transfer, TransferStatus::Pending).await?;
        move_ticket(&mut tx, ticket, TicketStatus::PendingTransfer).await?;
        tx.commit().await.map_err(StoreError::query)?;
        Ok(())
    }
}

#[async_trait]
impl MarketplaceStore for PostgresMarketplaceStore {
    async fn ticket(&self, id: TicketId) -> StoreResult<Option<Ticket>> {
        let row: Option<TicketRow> = sqlx::query_as(
            r#"
            SELECT id, event_id, tier_id, current_owner_id, status,
                   face_value, price_paid, created_at, updated_at
            FROM tickets WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::query)?;

        row.map(TicketRow::try_into_ticket).transpose()
    }

    async fn listing(&self, id: ListingId) -> StoreResult<Option<TicketListing>> {
        let row: Option<ListingRow> = sqlx::query_as(
            r#"
            SELECT id, ticket_id, event_id, seller_id, buyer_id, price,
                   status, created_at, updated_at, expires_at, sold_at
            FROM listings WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::query)?;

        row.map(ListingRow::try_into_listing).transpose()
    }

    async fn transfer(&self, id: TransferId) -> StoreResult<Option<TicketTransfer>> {
        let row: Option<TransferRow> = sqlx::query_as(
            r#"
            SELECT id, ticket_id, sender_id, receiver_id, recipient_email, token,
                   message, status, created_at, updated_at, expires_at, accepted_at
            FROM transfers WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::query)?;

        row.map(TransferRow::try_into_transfer).transpose()
    }

    async fn transfer_by_token(
        &self,
        token: &TransferToken,
    ) -> StoreResult<Option<TicketTransfer>> {
        let row: Option<TransferRow> = sqlx::query_as(
            r#"
            SELECT id, ticket_id, sender_id, receiver_id, recipient_email, token,
                   message, status, created_at, updated_at, expires_at, accepted_at
            FROM transfers WHERE token = $1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::query)?;

        row.map(TransferRow::try_into_transfer).transpose()
    }

    async fn event(&self, id: EventId) -> StoreResult<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(
            r#"
            SELECT id, name, status, start_time, allow_resale,
                   resale_cap_type, resale_cap_value, custom_resale_cap
            FROM events WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::query)?;

        row.map(EventRow::try_into_event).transpose()
    }

    async fn active_listing_for_ticket(
        &self,
        ticket_id: TicketId,
    ) -> StoreResult<Option<TicketListing>> {
        let row: Option<ListingRow> = sqlx::query_as(
            r#"
            SELECT id, ticket_id, event_id, seller_id, buyer_id, price,
                   status, created_at, updated_at, expires_at, sold_at
            FROM listings WHERE ticket_id = $1 AND status = 'ACTIVE'
            "#,
        )
        .bind(ticket_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::query)?;

        row.map(ListingRow::try_into_listing).transpose()
    }

    async fn pending_transfer_for_ticket(
        &self,
        ticket_id: TicketId,
    ) -> StoreResult<Option<TicketTransfer>> {
        let row: Option<TransferRow> = sqlx::query_as(
            r#"
            SELECT id, ticket_id, sender_id, receiver_id, recipient_email, token,
                   message, status, created_at, updated_at, expires_at, accepted_at
            FROM transfers WHERE ticket_id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(ticket_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::query)?;

        row.map(TransferRow::try_into_transfer).transpose()
    }

    async fn find_listings(&self, query: &ListingQuery) -> StoreResult<Vec<TicketListing>> {
        let rows: Vec<ListingRow> = sqlx::query_as(
            r#"
            SELECT id, ticket_id, event_id, seller_id, buyer_id, price,
                   status, created_at, updated_at, expires_at, sold_at
            FROM listings
            WHERE status = $1
              AND ($2::uuid IS NULL OR event_id = $2)
              AND ($3::bigint IS NULL OR price >= $3)
              AND ($4::bigint IS NULL OR price <= $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(query.status.to_string())
        .bind(query.event_id.map(EventId::get))
        .bind(query.min_price.map(Money::minor_units))
        .bind(query.max_price.map(Money::minor_units))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::query)?;

        rows.into_iter().map(ListingRow::try_into_listing).collect()
    }

    async fn listings_by_seller(&self, seller_id: UserId) -> StoreResult<Vec<TicketListing>> {
        let rows: Vec<ListingRow> = sqlx::query_as(
            r#"
            SELECT id, ticket_id, event_id, seller_id, buyer_id, price,
                   status, created_at, updated_at, expires_at, sold_at
            FROM listings WHERE seller_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(seller_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::query)?;

        rows.into_iter().map(ListingRow::try_into_listing).collect()
    }

    async fn transfers_by_sender(&self, sender_id: UserId) -> StoreResult<Vec<TicketTransfer>> {
        let rows: Vec<TransferRow> = sqlx::query_as(
            r#"
            SELECT id, ticket_id, sender_id, receiver_id, recipient_email, token,
                   message, status, created_at, updated_at, expires_at, accepted_at
            FROM transfers WHERE sender_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(sender_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::query)?;

        rows.into_iter()
            .map(TransferRow::try_into_transfer)
            .collect()
    }

    async fn transfers_by_recipient_email(
        &self,
        email: &EmailAddress,
    ) -> StoreResult<Vec<TicketTransfer>> {
        let rows: Vec<TransferRow> = sqlx::query_as(
            r#"
            SELECT id, ticket_id, sender_id, receiver_id, recipient_email, token,
                   message, status, created_at, updated_at, expires_at, accepted_at
            FROM transfers WHERE recipient_email = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(email.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::query)?;

        rows.into_iter()
            .map(TransferRow::try_into_transfer)
            .collect()
    }

    async fn create_listing(&self, listing: &TicketListing, ticket: &Ticket) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::connection)?;
        move_ticket(&mut tx, ticket, TicketStatus::Valid).await?;
        insert_listing(&mut tx, listing).await?;
        tx.commit().await.map_err(StoreError::query)?;
        Ok(())
    }

    async fn reprice_listing(&self, listing: &TicketListing) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::connection)?;

        let result = sqlx::query(
            r#"
            UPDATE listings SET price = $2, updated_at = $3
            WHERE id = $1 AND status = 'ACTIVE'
            "#,
        )
        .bind(listing.id().get())
        .bind(listing.price().minor_units())
        .bind(listing.updated_at().datetime())
        .execute(&mut *tx)
        .await
        .map_err(StoreError::query)?;

        if result.rows_affected() == 0 {
            return Err(listing_conflict(&mut tx, listing.id(), ListingStatus::Active).await);
        }

        tx.commit().await.map_err(StoreError::query)?;
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
        let mut tx = self.pool.begin().await.map_err(StoreError::connection)?;
        move_ticket(&mut tx, ticket, TicketStatus::Valid).await?;
        insert_transfer(&mut tx, transfer).await?;
        tx.commit().await.map_err(StoreError::query)?;
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
        sqlx::query(
            r#"
            INSERT INTO tickets (
                id, event_id, tier_id, current_owner_id, status,
                face_value, price_paid, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                current_owner_id = EXCLUDED.current_owner_id,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(ticket.id().get())
        .bind(ticket.event_id().get())
        .bind(ticket.tier_id().get())
        .bind(ticket.current_owner_id().get())
        .bind(ticket.status().to_string())
        .bind(ticket.face_value().minor_units())
        .bind(ticket.price_paid().minor_units())
        .bind(ticket.created_at().datetime())
        .bind(ticket.updated_at().datetime())
        .execute(&self.pool)
        .await
        .map_err(StoreError::query)?;

        Ok(())
    }

    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO events (
                id, name, status, start_time, allow_resale,
                resale_cap_type, resale_cap_value, custom_resale_cap
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                status = EXCLUDED.status,
                start_time = EXCLUDED.start_time,
                allow_resale = EXCLUDED.allow_resale,
                resale_cap_type = EXCLUDED.resale_cap_type,
                resale_cap_value = EXCLUDED.resale_cap_value,
                custom_resale_cap = EXCLUDED.custom_resale_cap
            "#,
        )
        .bind(event.id().get())
        .bind(event.name())
        .bind(event.status().to_string())
        .bind(event.start_time().datetime())
        .bind(event.allows_resale())
        .bind(event.resale_cap_type().map(|cap| cap.to_string()))
        .bind(event.resale_cap_value().map(i64::from))
        .bind(event.custom_resale_cap().map(Money::minor_units))
        .execute(&self.pool)
        .await
        .map_err(StoreError::query)?;

        Ok(())
    }
}

/// Applies a ticket entity's status and owner to its row, guarded on the
/// status the operation departs from.
async fn move_ticket(
    tx: &mut Transaction<'_, Postgres>,
    ticket: &Ticket,
    prior: TicketStatus,
) -> StoreResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE tickets SET status = $2, current_owner_id = $3, updated_at = $4
        WHERE id = $1 AND status = $5
        "#,
    )
    .bind(ticket.id().get())
    .bind(ticket.status().to_string())
    .bind(ticket.current_owner_id().get())
    .bind(ticket.updated_at().datetime())
    .bind(prior.to_string())
    .execute(&mut **tx)
    .await
    .map_err(StoreError::query)?;

    if result.rows_affected() == 0 {
        return Err(ticket_conflict(tx, ticket.id(), prior).await);
    }
    Ok(())
}

/// Applies a listing entity's resolved state to its row, guarded on the
/// status the operation departs from.
async fn move_listing(
    tx: &mut Transaction<'_, Postgres>,
    listing: &TicketListing,
    prior: ListingStatus,
) -> StoreResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE listings SET status = $2, buyer_id = $3, updated_at = $4, sold_at = $5
        WHERE id = $1 AND status = $6
        "#,
    )
    .bind(listing.id().get())
    .bind(listing.status().to_string())
    .bind(listing.buyer_id().map(UserId::get))
    .bind(listing.updated_at().datetime())
    .bind(listing.sold_at().map(Timestamp::datetime))
    .bind(prior.to_string())
    .execute(&mut **tx)
    .await
    .map_err(StoreError::query)?;

    if result.rows_affected() == 0 {
        return Err(listing_conflict(tx, listing.id(), prior).await);
    }
    Ok(())
}

/// Applies a transfer entity's resolved state to its row, guarded on the
/// status the operation departs from.
async fn move_transfer(
    tx: &mut Transaction<'_, Postgres>,
    transfer: &TicketTransfer,
    prior: TransferStatus,
) -> StoreResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE transfers SET status = $2, receiver_id = $3, updated_at = $4, accepted_at = $5
        WHERE id = $1 AND status = $6
        "#,
    )
    .bind(transfer.id().get())
    .bind(transfer.status().to_string())
    .bind(transfer.receiver_id().map(UserId::get))
    .bind(transfer.updated_at().datetime())
    .bind(transfer.accepted_at().map(Timestamp::datetime))
    .bind(prior.to_string())
    .execute(&mut **tx)
    .await
    .map_err(StoreError::query)?;

    if result.rows_affected() == 0 {
        return Err(transfer_conflict(tx, transfer.id(), prior).await);
    }
    Ok(())
}

async fn insert_listing(
    tx: &mut Transaction<'_, Postgres>,
    listing: &TicketListing,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO listings (
            id, ticket_id, event_id, seller_id, buyer_id, price,
            status, created_at, updated_at, expires_at, sold_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(listing.id().get())
    .bind(listing.ticket_id().get())
    .bind(listing.event_id().get())
    .bind(listing.seller_id().get())
    .bind(listing.buyer_id().map(UserId::get))
    .bind(listing.price().minor_units())
    .bind(listing.status().to_string())
    .bind(listing.created_at().datetime())
    .bind(listing.updated_at().datetime())
    .bind(listing.expires_at().datetime())
    .bind(listing.sold_at().map(Timestamp::datetime))
    .execute(&mut **tx)
    .await
    .map_err(StoreError::query)?;

    Ok(())
}

async fn insert_transfer(
    tx: &mut Transaction<'_, Postgres>,
    transfer: &TicketTransfer,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transfers (
            id, ticket_id, sender_id, receiver_id, recipient_email, token,
            message, status, created_at, updated_at, expires_at, accepted_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(transfer.id().get())
    .bind(transfer.ticket_id().get())
    .bind(transfer.sender_id().get())
    .bind(transfer.receiver_id().map(UserId::get))
    .bind(transfer.recipient_email().as_str())
    .bind(transfer.token().as_str())
    .bind(transfer.message())
    .bind(transfer.status().to_string())
    .bind(transfer.created_at().datetime())
    .bind(transfer.updated_at().datetime())
    .bind(transfer.expires_at().datetime())
    .bind(transfer.accepted_at().map(Timestamp::datetime))
    .execute(&mut **tx)
    .await
    .map_err(StoreError::query)?;

    Ok(())
}

/// Explains a failed ticket guard: missing row or a row whose status
/// already moved on.
async fn ticket_conflict(
    tx: &mut Transaction<'_, Postgres>,
    id: TicketId,
    expected: TicketStatus,
) -> StoreError {
    let row: Result<Option<(String,)>, sqlx::Error> =
        sqlx::query_as("SELECT status FROM tickets WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&mut **tx)
            .await;

    match row {
        Ok(Some((actual,))) => StoreError::precondition_failed(format!(
            "ticket {id} is {actual}, expected {expected}"
        )),
        Ok(None) => StoreError::not_found("ticket", id),
        Err(e) => StoreError::query(e),
    }
}

/// Explains a failed listing guard.
async fn listing_conflict(
    tx: &mut Transaction<'_, Postgres>,
    id: ListingId,
    expected: ListingStatus,
) -> StoreError {
    let row: Result<Option<(String,)>, sqlx::Error> =
        sqlx::query_as("SELECT status FROM listings WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&mut **tx)
            .await;

    match row {
        Ok(Some((actual,))) => StoreError::precondition_failed(format!(
            "listing {id} is {actual}, expected {expected}"
        )),
        Ok(None) => StoreError::not_found("listing", id),
        Err(e) => StoreError::query(e),
    }
}

/// Explains a failed transfer guard.
async fn transfer_conflict(
    tx: &mut Transaction<'_, Postgres>,
    id: TransferId,
    expected: TransferStatus,
) -> StoreError {
    let row: Result<Option<(String,)>, sqlx::Error> =
        sqlx::query_as("SELECT status FROM transfers WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&mut **tx)
            .await;

    match row {
        Ok(Some((actual,))) => StoreError::precondition_failed(format!(
            "transfer {id} is {actual}, expected {expected}"
        )),
        Ok(None) => StoreError::not_found("transfer", id),
        Err(e) => StoreError::query(e),
    }
}

/// Row type for ticket queries.
#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    event_id: Uuid,
    tier_id: Uuid,
    current_owner_id: Uuid,
    status: String,
    face_value: i64,
    price_paid: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TicketRow {
    /// Converts the row into a ticket entity.
    fn try_into_ticket(self) -> StoreResult<Ticket> {
        let status: TicketStatus = self.status.parse().map_err(StoreError::query)?;
        let face_value = Money::from_minor(self.face_value).map_err(StoreError::query)?;
        let price_paid = Money::from_minor(self.price_paid).map_err(StoreError::query)?;

        Ok(Ticket::from_parts(
            TicketId::new(self.id),
            EventId::new(self.event_id),
            TierId::new(self.tier_id),
            UserId::new(self.current_owner_id),
            status,
            face_value,
            price_paid,
            Timestamp::from_datetime(self.created_at),
            Timestamp::from_datetime(self.updated_at),
        ))
    }
}

/// Row type for listing queries.
#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    ticket_id: Uuid,
    event_id: Uuid,
    seller_id: Uuid,
    buyer_id: Option<Uuid>,
    price: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    sold_at: Option<DateTime<Utc>>,
}

impl ListingRow {
    /// Converts the row into a listing entity.
    fn try_into_listing(self) -> StoreResult<TicketListing> {
        let status: ListingStatus = self.status.parse().map_err(StoreError::query)?;
        let price = Money::from_minor(self.price).map_err(StoreError::query)?;

        Ok(TicketListing::from_parts(
            ListingId::new(self.id),
            TicketId::new(self.ticket_id),
            EventId::new(self.event_id),
            UserId::new(self.seller_id),
            self.buyer_id.map(UserId::new),
            price,
            status,
            Timestamp::from_datetime(self.created_at),
            Timestamp::from_datetime(self.updated_at),
            Timestamp::from_datetime(self.expires_at),
            self.sold_at.map(Timestamp::from_datetime),
        ))
    }
}

/// Row type for transfer queries.
#[derive(Debug, sqlx::FromRow)]
struct TransferRow {
    id: Uuid,
    ticket_id: Uuid,
    sender_id: Uuid,
    receiver_id: Option<Uuid>,
    recipient_email: String,
    token: String,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
}

impl TransferRow {
    /// Converts the row into a transfer entity.
    fn try_into_transfer(self) -> StoreResult<TicketTransfer> {
        let status: TransferStatus = self.status.parse().map_err(StoreError::query)?;
        let recipient_email = EmailAddress::new(&self.recipient_email).map_err(StoreError::query)?;

        Ok(TicketTransfer::from_parts(
            TransferId::new(self.id),
            TicketId::new(self.ticket_id),
            UserId::new(self.sender_id),
            self.receiver_id.map(UserId::new),
            recipient_email,
            TransferToken::new(self.token),
            self.message,
            status,
            Timestamp::from_datetime(self.created_at),
            Timestamp::from_datetime(self.updated_at),
            Timestamp::from_datetime(self.expires_at),
            self.accepted_at.map(Timestamp::from_datetime),
        ))
    }
}

/// Row type for event queries.
#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    status: String,
    start_time: DateTime<Utc>,
    allow_resale: bool,
    resale_cap_type: Option<String>,
    resale_cap_value: Option<i64>,
    custom_resale_cap: Option<i64>,
}

impl EventRow {
    /// Converts the row into an event entity.
    fn try_into_event(self) -> StoreResult<Event> {
        let status: EventStatus = self.status.parse().map_err(StoreError::query)?;
        let resale_cap_type = self
            .resale_cap_type
            .map(|cap| cap.parse::<ResaleCapType>())
            .transpose()
            .map_err(StoreError::query)?;
        let resale_cap_value = self
            .resale_cap_value
            .map(u32::try_from)
            .transpose()
            .map_err(StoreError::query)?;
        let custom_resale_cap = self
            .custom_resale_cap
            .map(Money::from_minor)
            .transpose()
            .map_err(StoreError::query)?;

        Ok(Event::from_parts(
            EventId::new(self.id),
            self.name,
            status,
            Timestamp::from_datetime(self.start_time),
            self.allow_resale,
            resale_cap_type,
            resale_cap_value,
            custom_resale_cap,
        ))
    }
}
