//! # REST Handlers
//!
//! Request handlers for REST endpoints.
//!
//! This module provides axum handlers for the resale marketplace and
//! ticket transfer operations, plus the error mapping from
//! [`MarketplaceError`] kinds to HTTP status codes.
//!
//! # Endpoints
//!
//! ## Listings
//! - `GET /api/v1/listings` - Browse active listings with filters
//! - `POST /api/v1/listings` - List a ticket for resale
//! - `GET /api/v1/listings/mine` - The caller's listings
//! - `GET /api/v1/listings/{id}` - Get listing by ID
//! - `PATCH /api/v1/listings/{id}` - Change the asking price
//! - `DELETE /api/v1/listings/{id}` - Cancel a listing
//! - `POST /api/v1/listings/{id}/purchase` - Open a payment intent
//!
//! ## Payments
//! - `POST /api/v1/payments/resale/confirm` - Settle a confirmed payment
//!
//! ## Transfers
//! - `POST /api/v1/transfers` - Send a ticket to a recipient email
//! - `GET /api/v1/transfers/mine` - The caller's sent and received transfers
//! - `GET /api/v1/transfers/token/{token}` - Inspect a claim link
//! - `POST /api/v1/transfers/token/{token}/respond` - Accept or reject
//! - `DELETE /api/v1/transfers/{id}` - Cancel a pending transfer

use crate::api::middleware::auth::CurrentUser;
use crate::application::dto::{
    CreateListingRequest, CreateListingResponse, CreateTransferRequest, CreateTransferResponse,
    GetTransferResponse, ListingDetails, PurchaseListingRequest, PurchaseListingResponse,
    RespondToTransferRequest, RespondToTransferResponse, SettlePurchaseRequest,
    SettlePurchaseResponse, TransferDetails, UpdateListingRequest, UserTransfersResponse,
};
use crate::application::error::{ErrorKind, MarketplaceError};
use crate::application::services::{ResaleMarketService, TicketTransferService};
use crate::domain::value_objects::{EventId, ListingId, Money, TransferId, TransferToken};
use crate::infrastructure::payments::PaymentError;
use crate::infrastructure::persistence::ListingQuery;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for REST handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Resale marketplace operations.
    pub market: Arc<ResaleMarketService>,
    /// Ticket transfer operations.
    pub transfers: Arc<TicketTransferService>,
}

// ============================================================================
// Error Response
// ============================================================================

/// Standard error response format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Creates a new error response.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates an error response with details.
    #[must_use]
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

impl From<MarketplaceError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: MarketplaceError) -> Self {
        // Transport-level gateway failures are the one case the kind
        // alone cannot distinguish: the upstream provider failed us.
        if let MarketplaceError::Payment(PaymentError::Request(_) | PaymentError::Protocol(_)) =
            &err
        {
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::new("PAYMENT_GATEWAY_ERROR", err.to_string())),
            );
        }

        let (status, code) = match err.kind() {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ErrorKind::InvalidState => (StatusCode::CONFLICT, "CONFLICT"),
            ErrorKind::PolicyViolation => (StatusCode::UNPROCESSABLE_ENTITY, "POLICY_VIOLATION"),
            ErrorKind::Expired => (StatusCode::GONE, "EXPIRED"),
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let response = match &err {
            MarketplaceError::PriceExceedsCap { ceiling } => ErrorResponse::with_details(
                code,
                err.to_string(),
                serde_json::json!({
                    "max_price": ceiling.max_price().map(Money::minor_units),
                    "cap": ceiling.describe(),
                }),
            ),
            _ => ErrorResponse::new(code, err.to_string()),
        };

        (status, Json(response))
    }
}

// ============================================================================
// Listing Filters
// ============================================================================

/// Query parameters for browsing listings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListingFilters {
    /// Restrict to one event.
    pub event_id: Option<EventId>,
    /// Lowest asking price to include, in minor units.
    pub min_price: Option<Money>,
    /// Highest asking price to include, in minor units.
    pub max_price: Option<Money>,
}

impl From<ListingFilters> for ListingQuery {
    fn from(filters: ListingFilters) -> Self {
        Self {
            event_id: filters.event_id,
            min_price: filters.min_price,
            max_price: filters.max_price,
            ..Self::default()
        }
    }
}

// ============================================================================
// Listing Handlers
// ============================================================================

/// Browse active listings.
///
/// # Errors
///
/// Returns an error response if the store query fails.
#[instrument(skip(state))]
pub async fn list_listings(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<ListingFilters>,
) -> Result<Json<Vec<ListingDetails>>, (StatusCode, Json<ErrorResponse>)> {
    let listings = state.market.find_listings(filters.into()).await?;

    Ok(Json(listings))
}

/// List a ticket for resale.
///
/// # Errors
///
/// Returns an error response when the caller does not own the ticket, the
/// event forbids resale, or the price exceeds the cap.
#[instrument(skip(state, request))]
pub async fn create_listing(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<CreateListingResponse>), (StatusCode, Json<ErrorResponse>)> {
    info!(seller_id = %user.id, ticket_id = %request.ticket_id, "creating listing");

    let response = state.market.create_listing(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// The caller's listings, newest first.
///
/// # Errors
///
/// Returns an error response if the store query fails.
#[instrument(skip(state))]
pub async fn my_listings(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<ListingDetails>>, (StatusCode, Json<ErrorResponse>)> {
    let listings = state.market.seller_listings(user.id).await?;

    Ok(Json(listings))
}

/// Get listing by ID.
///
/// # Errors
///
/// Returns `NOT_FOUND` if the listing does not exist.
/// Returns `VALIDATION_ERROR` if the ID is not a valid UUID.
#[instrument(skip(state))]
pub async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ListingDetails>, (StatusCode, Json<ErrorResponse>)> {
    let listing_id = parse_listing_id(&id)?;
    let listing = state.market.get_listing(listing_id).await?;

    Ok(Json(listing))
}

/// Change the asking price of an active listing.
///
/// # Errors
///
/// Returns an error response when the caller is not the seller, the
/// listing is not active, or the new price exceeds the cap.
#[instrument(skip(state, request))]
pub async fn update_listing(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<Json<ListingDetails>, (StatusCode, Json<ErrorResponse>)> {
    let listing_id = parse_listing_id(&id)?;
    let listing = state
        .market
        .update_listing(listing_id, user.id, request)
        .await?;

    Ok(Json(listing))
}

/// Cancel a listing, releasing the ticket back to its owner.
///
/// # Errors
///
/// Returns an error response when the caller is not the seller or the
/// listing is not active.
#[instrument(skip(state))]
pub async fn cancel_listing(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ListingDetails>, (StatusCode, Json<ErrorResponse>)> {
    let listing_id = parse_listing_id(&id)?;
    let listing = state.market.cancel_listing(listing_id, user.id).await?;

    Ok(Json(listing))
}

/// Open a payment intent for a listing.
///
/// # Errors
///
/// Returns an error response when the listing is not purchasable, the
/// caller is the seller, or the gateway rejects the intent.
#[instrument(skip(state, request))]
pub async fn purchase_listing(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<PurchaseListingRequest>,
) -> Result<Json<PurchaseListingResponse>, (StatusCode, Json<ErrorResponse>)> {
    let listing_id = parse_listing_id(&id)?;
    info!(listing_id = %listing_id, buyer_id = %user.id, "starting purchase");

    let response = state
        .market
        .purchase_listing(listing_id, user.id, request)
        .await?;

    Ok(Json(response))
}

// ============================================================================
// Payment Handlers
// ============================================================================

/// Settle a purchase after the gateway reports the payment succeeded.
///
/// Driven from the payment provider's webhook context rather than a user
/// session, so there is no bearer token on this route. Safe to redeliver:
/// a second call observes the sold listing and gets `CONFLICT`.
///
/// # Errors
///
/// Returns an error response when the intent has not succeeded or the
/// listing already settled.
#[instrument(skip(state, request))]
pub async fn confirm_resale_payment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SettlePurchaseRequest>,
) -> Result<Json<SettlePurchaseResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(payment_intent_id = %request.payment_intent_id, "settling purchase");

    let response = state.market.settle_purchase(request).await?;

    Ok(Json(response))
}

// ============================================================================
// Transfer Handlers
// ============================================================================

/// Send a ticket to a recipient email.
///
/// # Errors
///
/// Returns an error response when the caller does not own the ticket, the
/// ticket is encumbered, or the recipient is the caller's own email.
#[instrument(skip(state, request))]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<CreateTransferRequest>,
) -> Result<(StatusCode, Json<CreateTransferResponse>), (StatusCode, Json<ErrorResponse>)> {
    info!(sender_id = %user.id, ticket_id = %request.ticket_id, "creating transfer");

    let response = state.transfers.create_transfer(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// The caller's sent and received transfers.
///
/// # Errors
///
/// Returns an error response if the store query fails.
#[instrument(skip(state))]
pub async fn my_transfers(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<UserTransfersResponse>, (StatusCode, Json<ErrorResponse>)> {
    let response = state.transfers.user_transfers(user.id).await?;

    Ok(Json(response))
}

/// Inspect a transfer claim link.
///
/// Public: the recipient follows the emailed link before signing in. The
/// response carries an `expired` flag so the page can explain a dead link
/// without mutating anything.
///
/// # Errors
///
/// Returns `NOT_FOUND` if no transfer matches the token.
#[instrument(skip(state))]
pub async fn get_transfer_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<GetTransferResponse>, (StatusCode, Json<ErrorResponse>)> {
    let token = TransferToken::new(token);
    let response = state.transfers.get_transfer_by_token(&token).await?;

    Ok(Json(response))
}

/// Accept or reject a transfer.
///
/// # Errors
///
/// Returns an error response when the caller is not the intended
/// recipient, the transfer already resolved, or the invitation expired.
#[instrument(skip(state, request))]
pub async fn respond_to_transfer(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(token): Path<String>,
    Json(request): Json<RespondToTransferRequest>,
) -> Result<Json<RespondToTransferResponse>, (StatusCode, Json<ErrorResponse>)> {
    let token = TransferToken::new(token);
    info!(responder_id = %user.id, response = %request.response, "responding to transfer");

    let response = state
        .transfers
        .respond_to_transfer(&token, user.id, request)
        .await?;

    Ok(Json(response))
}

/// Cancel a pending transfer, releasing the ticket back to the sender.
///
/// # Errors
///
/// Returns an error response when the caller is not the sender or the
/// transfer is not pending.
#[instrument(skip(state))]
pub async fn cancel_transfer(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TransferDetails>, (StatusCode, Json<ErrorResponse>)> {
    let transfer_id = parse_transfer_id(&id)?;
    let transfer = state
        .transfers
        .cancel_transfer(transfer_id, user.id)
        .await?;

    Ok(Json(transfer))
}

// ============================================================================
// Health Check
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_listing_id(id: &str) -> Result<ListingId, (StatusCode, Json<ErrorResponse>)> {
    uuid::Uuid::parse_str(id)
        .map(ListingId::new)
        .map_err(|_| validation_error(&format!("invalid listing ID: {id}")))
}

fn parse_transfer_id(id: &str) -> Result<TransferId, (StatusCode, Json<ErrorResponse>)> {
    uuid::Uuid::parse_str(id)
        .map(TransferId::new)
        .map_err(|_| validation_error(&format!("invalid transfer ID: {id}")))
}

fn validation_error(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("VALIDATION_ERROR", message)),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{Event, Ticket};
    use crate::domain::services::resale_pricing::max_resale_price;
    use crate::domain::value_objects::{ResaleCapType, Timestamp, TierId, UserId};

    #[test]
    fn error_response_new() {
        let err = ErrorResponse::new("TEST_ERROR", "test message");
        assert_eq!(err.code, "TEST_ERROR");
        assert_eq!(err.message, "test message");
        assert!(err.details.is_none());
    }

    #[test]
    fn error_response_with_details() {
        let details = serde_json::json!({"field": "price"});
        let err = ErrorResponse::with_details("VALIDATION_ERROR", "invalid field", details.clone());
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.details, Some(details));
    }

    #[test]
    fn error_mapping_follows_the_kind() {
        let cases = [
            (
                MarketplaceError::listing_not_found(ListingId::new_v4()),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                MarketplaceError::forbidden("not yours"),
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
            ),
            (
                MarketplaceError::invalid_state("already sold"),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                MarketplaceError::policy_violation("already listed for sale"),
                StatusCode::UNPROCESSABLE_ENTITY,
                "POLICY_VIOLATION",
            ),
            (
                MarketplaceError::expired("listing expired"),
                StatusCode::GONE,
                "EXPIRED",
            ),
            (
                MarketplaceError::validation("price must be positive"),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                MarketplaceError::storage("connection reset"),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (err, expected_status, expected_code) in cases {
            let (status, Json(body)): (StatusCode, Json<ErrorResponse>) = err.into();
            assert_eq!(status, expected_status);
            assert_eq!(body.code, expected_code);
        }
    }

    #[test]
    fn gateway_transport_failures_map_to_bad_gateway() {
        let err = MarketplaceError::Payment(PaymentError::request("connect timeout"));
        let (status, Json(body)): (StatusCode, Json<ErrorResponse>) = err.into();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "PAYMENT_GATEWAY_ERROR");

        // A decline is not a transport failure
        let err = MarketplaceError::Payment(PaymentError::declined("card declined"));
        let (status, _): (StatusCode, Json<ErrorResponse>) = err.into();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn cap_violations_carry_the_ceiling_in_details() {
        let event = Event::builder("Cap Night", Timestamp::now().add_days(30))
            .resale_cap_type(ResaleCapType::PercentageCap)
            .resale_cap_value(110)
            .build();
        let ticket = Ticket::new(
            event.id(),
            TierId::new_v4(),
            UserId::new_v4(),
            Money::from_minor(10_000).unwrap(),
            Money::from_minor(10_000).unwrap(),
        );

        let err = MarketplaceError::price_exceeds_cap(max_resale_price(&ticket, &event));
        let (status, Json(body)): (StatusCode, Json<ErrorResponse>) = err.into();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.code, "POLICY_VIOLATION");
        let details = body.details.unwrap();
        assert_eq!(details["max_price"], serde_json::json!(11_000));
    }

    #[test]
    fn listing_filters_convert_to_an_active_query() {
        let filters = ListingFilters {
            event_id: Some(EventId::new_v4()),
            min_price: Some(Money::from_minor(5_000).unwrap()),
            max_price: None,
        };
        let query = ListingQuery::from(filters.clone());
        assert_eq!(query.event_id, filters.event_id);
        assert_eq!(query.min_price, filters.min_price);
        assert!(query.max_price.is_none());
        assert_eq!(
            query.status,
            crate::domain::value_objects::ListingStatus::Active
        );
    }

    #[test]
    fn parse_listing_id_valid() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        assert!(parse_listing_id(id).is_ok());
    }

    #[test]
    fn parse_listing_id_invalid() {
        let result = parse_listing_id("not-a-uuid");
        let (status, Json(body)) = result.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "VALIDATION_ERROR");
    }

    #[test]
    fn parse_transfer_id_valid() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        assert!(parse_transfer_id(id).is_ok());
    }

    #[tokio::test]
    async fn health_check_returns_healthy() {
        let response = health_check().await;
        assert_eq!(response.status, "healthy");
    }
}
