//! # REST Routes
//!
//! Route definitions for the REST API.
//!
//! # Route Structure
//!
//! ```text
//! /api/v1
//! ├── /health                           GET    - Health check
//! ├── /listings                         GET    - Browse active listings
//! │   ├── /                             POST   - List a ticket for resale †
//! │   ├── /mine                         GET    - The caller's listings †
//! │   └── /{id}                         GET    - Get listing by ID
//! │       ├── /                         PATCH  - Change the asking price †
//! │       ├── /                         DELETE - Cancel a listing †
//! │       └── /purchase                 POST   - Open a payment intent †
//! ├── /payments/resale/confirm          POST   - Settle a confirmed payment
//! └── /transfers                        POST   - Send a ticket to an email †
//!     ├── /mine                         GET    - Sent and received transfers †
//!     ├── /token/{token}                GET    - Inspect a claim link
//!     │   └── /respond                  POST   - Accept or reject †
//!     └── /{id}                         DELETE - Cancel a pending transfer †
//! ```
//!
//! Routes marked † require a bearer token.
//!
//! # Examples
//!
//! ```ignore
//! use boxoffice::api::rest::routes::create_router;
//! use boxoffice::api::rest::handlers::AppState;
//!
//! let state = Arc::new(AppState { market, transfers });
//! let auth = Arc::new(AuthConfig::new(config.auth.jwt_secret.clone()));
//! let router = create_router(state, auth, &config.rest);
//!
//! axum::serve(listener, router).await?;
//! ```

use crate::api::middleware::auth::{AuthConfig, require_auth};
use crate::api::rest::handlers::{
    AppState, cancel_listing, cancel_transfer, confirm_resale_payment, create_listing,
    create_transfer, get_listing, get_transfer_by_token, health_check, list_listings, my_listings,
    my_transfers, purchase_listing, respond_to_transfer, update_listing,
};
use crate::config::RestConfig;
use axum::http::HeaderValue;
use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Creates the REST API router with all endpoints and middleware.
///
/// # Arguments
///
/// * `state` - Shared application state holding the services
/// * `auth` - Bearer token validation settings for protected routes
/// * `rest` - Server settings for the timeout and CORS layers
#[must_use]
pub fn create_router(state: Arc<AppState>, auth: Arc<AuthConfig>, rest: &RestConfig) -> Router {
    let router = Router::new()
        .nest("/api/v1", api_v1_routes(state, auth))
        .layer(TimeoutLayer::new(Duration::from_secs(rest.request_timeout_secs)))
        .layer(TraceLayer::new_for_http());

    if rest.enable_cors {
        router.layer(cors_layer(&rest.cors_origins))
    } else {
        router
    }
}

/// Builds the CORS layer. An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// The `/api/v1` route tree, without the outer middleware stack.
///
/// Split out so tests can drive the same routes without tracing or CORS.
fn api_v1_routes(state: Arc<AppState>, auth: Arc<AuthConfig>) -> Router {
    // Routes that act for an authenticated user
    let protected = Router::new()
        .route("/listings", post(create_listing))
        .route("/listings/mine", get(my_listings))
        .route("/listings/{id}", patch(update_listing).delete(cancel_listing))
        .route("/listings/{id}/purchase", post(purchase_listing))
        .route("/transfers", post(create_transfer))
        .route("/transfers/mine", get(my_transfers))
        .route("/transfers/token/{token}/respond", post(respond_to_transfer))
        .route("/transfers/{id}", delete(cancel_transfer))
        .route_layer(middleware::from_fn_with_state(auth, require_auth));

    // Public routes: browsing, claim-link inspection, the health probe,
    // and the settlement entry point driven by the payment provider
    Router::new()
        .route("/health", get(health_check))
        .route("/listings", get(list_listings))
        .route("/listings/{id}", get(get_listing))
        .route("/payments/resale/confirm", post(confirm_resale_payment))
        .route("/transfers/token/{token}", get(get_transfer_by_token))
        .merge(protected)
        .with_state(state)
}

/// Creates a minimal router for testing without the middleware stack.
#[cfg(test)]
pub fn create_test_router(state: Arc<AppState>, auth: Arc<AuthConfig>) -> Router {
    Router::new().nest("/api/v1", api_v1_routes(state, auth))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::middleware::auth::{Claims, create_jwt};
    use crate::api::rest::handlers::ErrorResponse;
    use crate::application::dto::{
        CreateListingResponse, CreateTransferResponse, GetTransferResponse, ListingDetails,
    };
    use crate::application::services::{
        RecordingPublisher, ResaleMarketService, SystemClock, TicketTransferService,
    };
    use crate::domain::entities::{Event, Ticket, User};
    use crate::domain::value_objects::{
        EmailAddress, ListingStatus, Money, ResaleCapType, TierId, Timestamp, UserId,
    };
    use crate::infrastructure::payments::{SimulatedGateway, SimulatorConfig};
    use crate::infrastructure::persistence::{InMemoryMarketplaceStore, InMemoryUserDirectory};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    const TEST_SECRET: &str = "router-test-secret";

    struct Harness {
        router: Router,
        store: Arc<InMemoryMarketplaceStore>,
        users: Arc<InMemoryUserDirectory>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryMarketplaceStore::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let gateway = Arc::new(SimulatedGateway::new(SimulatorConfig::default()));
        let publisher = Arc::new(RecordingPublisher::new());
        let clock = Arc::new(SystemClock);

        let market = Arc::new(ResaleMarketService::new(
            store.clone(),
            gateway,
            publisher.clone(),
            clock.clone(),
        ));
        let transfers = Arc::new(TicketTransferService::new(
            store.clone(),
            users.clone(),
            publisher,
            clock,
        ));

        let state = Arc::new(AppState { market, transfers });
        let auth = Arc::new(AuthConfig::new(TEST_SECRET));

        Harness {
            router: create_test_router(state, auth),
            store,
            users,
        }
    }

    async fn seed_user(harness: &Harness, email: &str) -> User {
        let user = User::new(
            UserId::new_v4(),
            EmailAddress::new(email).unwrap(),
            "Someone",
        );
        harness.users.insert(&user).await;
        user
    }

    /// Seeds a published event with a 110% cap and a valid ticket owned by
    /// `owner`, face value 10 000 minor units.
    async fn seed_ticket(harness: &Harness, owner: UserId) -> Ticket {
        let event = Event::builder("Night Out", Timestamp::now().add_days(30))
            .resale_cap_type(ResaleCapType::PercentageCap)
            .resale_cap_value(110)
            .build();
        let ticket = Ticket::new(
            event.id(),
            TierId::new_v4(),
            owner,
            Money::from_minor(10_000).unwrap(),
            Money::from_minor(10_000).unwrap(),
        );
        harness.store.insert_event(&event).await.unwrap();
        harness.store.insert_ticket(&ticket).await.unwrap();
        ticket
    }

    fn bearer_token(user: &User) -> String {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = Claims::new(
            user.id().to_string(),
            user.email().as_str(),
            now + 3600,
            now,
        );
        create_jwt(&claims, TEST_SECRET).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn authed_json(
        method: &str,
        uri: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(
        response: axum::http::Response<Body>,
    ) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_check_endpoint() {
        let harness = harness();

        let response = harness.router.oneshot(get("/api/v1/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn browsing_listings_is_public() {
        let harness = harness();

        let response = harness
            .router
            .oneshot(get("/api/v1/listings"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let listings: Vec<ListingDetails> = json_body(response).await;
        assert!(listings.is_empty());
    }

    #[tokio::test]
    async fn get_listing_not_found() {
        let harness = harness();

        let response = harness
            .router
            .oneshot(get("/api/v1/listings/550e8400-e29b-41d4-a716-446655440000"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = json_body(response).await;
        assert_eq!(body.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn get_listing_rejects_garbage_ids() {
        let harness = harness();

        let response = harness
            .router
            .oneshot(get("/api/v1/listings/not-a-uuid"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn creating_a_listing_requires_a_token() {
        let harness = harness();

        let response = harness
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/listings")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = json_body(response).await;
        assert_eq!(body["code"], "MISSING_CREDENTIALS");
    }

    #[tokio::test]
    async fn invalid_tokens_are_rejected() {
        let harness = harness();

        let response = harness
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/listings/mine")
                    .header(header::AUTHORIZATION, "Bearer garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn listing_flow_over_http() {
        let harness = harness();
        let seller = seed_user(&harness, "seller@example.com").await;
        let ticket = seed_ticket(&harness, seller.id()).await;
        let token = bearer_token(&seller);

        // Create at the cap
        let response = harness
            .router
            .clone()
            .oneshot(authed_json(
                "POST",
                "/api/v1/listings",
                &token,
                &serde_json::json!({"ticket_id": ticket.id(), "price": 11_000}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: CreateListingResponse = json_body(response).await;
        assert_eq!(created.listing.status, ListingStatus::Active);

        // It shows up in the public browse
        let response = harness
            .router
            .clone()
            .oneshot(get("/api/v1/listings?min_price=10000&max_price=12000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listings: Vec<ListingDetails> = json_body(response).await;
        assert_eq!(listings.len(), 1);

        // And under the seller's own listings
        let response = harness
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/listings/mine")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mine: Vec<ListingDetails> = json_body(response).await;
        assert_eq!(mine.len(), 1);

        // Cancelling it releases the ticket
        let listing_id = created.listing.id;
        let response = harness
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/listings/{listing_id}"))
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cancelled: ListingDetails = json_body(response).await;
        assert_eq!(cancelled.status, ListingStatus::Cancelled);
    }

    #[tokio::test]
    async fn cap_violations_surface_as_unprocessable() {
        let harness = harness();
        let seller = seed_user(&harness, "seller@example.com").await;
        let ticket = seed_ticket(&harness, seller.id()).await;
        let token = bearer_token(&seller);

        let response = harness
            .router
            .oneshot(authed_json(
                "POST",
                "/api/v1/listings",
                &token,
                &serde_json::json!({"ticket_id": ticket.id(), "price": 11_001}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = json_body(response).await;
        assert_eq!(body.code, "POLICY_VIOLATION");
        assert!(body.message.contains("110% of face value"));
    }

    #[tokio::test]
    async fn strangers_cannot_cancel_a_listing() {
        let harness = harness();
        let seller = seed_user(&harness, "seller@example.com").await;
        let stranger = seed_user(&harness, "stranger@example.com").await;
        let ticket = seed_ticket(&harness, seller.id()).await;

        let response = harness
            .router
            .clone()
            .oneshot(authed_json(
                "POST",
                "/api/v1/listings",
                &bearer_token(&seller),
                &serde_json::json!({"ticket_id": ticket.id(), "price": 10_000}),
            ))
            .await
            .unwrap();
        let created: CreateListingResponse = json_body(response).await;

        let response = harness
            .router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/listings/{}", created.listing.id))
                    .header(
                        header::AUTHORIZATION,
                        format!("Bearer {}", bearer_token(&stranger)),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn transfer_flow_over_http() {
        let harness = harness();
        let sender = seed_user(&harness, "sender@example.com").await;
        let recipient = seed_user(&harness, "recipient@example.com").await;
        let ticket = seed_ticket(&harness, sender.id()).await;

        // Send the ticket
        let response = harness
            .router
            .clone()
            .oneshot(authed_json(
                "POST",
                "/api/v1/transfers",
                &bearer_token(&sender),
                &serde_json::json!({
                    "ticket_id": ticket.id(),
                    "recipient_email": "recipient@example.com",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: CreateTransferResponse = json_body(response).await;
        let token_segment = created.transfer.token.as_str().to_string();

        // The claim link is publicly inspectable
        let response = harness
            .router
            .clone()
            .oneshot(get(&format!("/api/v1/transfers/token/{token_segment}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let view: GetTransferResponse = json_body(response).await;
        assert!(!view.expired);

        // Responding needs a token
        let response = harness
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/transfers/token/{token_segment}/respond"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"response":"ACCEPT"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // The recipient accepts
        let response = harness
            .router
            .oneshot(authed_json(
                "POST",
                &format!("/api/v1/transfers/token/{token_segment}/respond"),
                &bearer_token(&recipient),
                &serde_json::json!({"response": "ACCEPT"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_claim_tokens_are_not_found() {
        let harness = harness();

        let response = harness
            .router
            .oneshot(get("/api/v1/transfers/token/no-such-token"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn settlement_route_is_token_free_but_validated() {
        let harness = harness();

        let response = harness
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/payments/resale/confirm")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"payment_intent_id":"pi_missing"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        // The simulator has no such intent
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
