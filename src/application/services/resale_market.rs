//! # Resale Marketplace Service
//!
//! Orchestrates the resale lifecycle: creating listings, browsing them,
//! repricing, cancellation, purchase intents, and post-payment settlement.
//!
//! Every mutating operation reads current state, validates preconditions,
//! commits one atomic store mutation, and then publishes a domain event.
//! Publishing is best effort; the committed mutation is the source of
//! truth. Expiry is checked lazily against the service clock: a mutating
//! operation that meets a past-deadline listing flips it to `Expired`,
//! reverts the ticket, and fails with [`MarketplaceError::Expired`].

use crate::application::dto::listing_dto::{
    CreateListingRequest, CreateListingResponse, ListingDetails, PaymentHandle, PriceBreakdown,
    PurchaseListingRequest, PurchaseListingResponse, SettlePurchaseRequest, SettlePurchaseResponse,
    UpdateListingRequest,
};
use crate::application::error::{MarketResult, MarketplaceError};
use crate::application::services::clock::Clock;
use crate::application::services::publisher::EventPublisher;
use crate::domain::entities::TicketListing;
use crate::domain::events::MarketplaceEvent;
use crate::domain::services::resale_pricing::max_resale_price;
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{EmailAddress, ListingId, PaymentIntentId, UserId};
use crate::infrastructure::payments::{CreateIntentRequest, PaymentGateway, PaymentMetadata};
use crate::infrastructure::persistence::traits::{ListingQuery, MarketplaceStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Default platform fee, in whole percent of the asking price.
const DEFAULT_FEE_PERCENT: u32 = 8;

/// Listings stop being purchasable this long before the event starts.
const LISTING_CLOSES_BEFORE_START_HOURS: i64 = 2;

/// Configuration for the resale marketplace.
#[derive(Debug, Clone)]
pub struct ResaleMarketConfig {
    /// Platform fee charged on top of the asking price, in whole percent.
    pub fee_percent: u32,
    /// ISO 4217 currency code sent to the payment gateway, lowercase.
    pub currency: String,
}

impl Default for ResaleMarketConfig {
    fn default() -> Self {
        Self {
            fee_percent: DEFAULT_FEE_PERCENT,
            currency: "gbp".to_string(),
        }
    }
}

/// Application service for the resale marketplace.
///
/// Holds the store, the payment gateway, the event publisher, and the
/// clock behind trait objects so tests can substitute any of them.
#[derive(Debug)]
pub struct ResaleMarketService {
    store: Arc<dyn MarketplaceStore>,
    gateway: Arc<dyn PaymentGateway>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    config: ResaleMarketConfig,
}

impl ResaleMarketService {
    /// Creates a new service with default configuration.
    #[must_use]
    pub fn new(
        store: Arc<dyn MarketplaceStore>,
        gateway: Arc<dyn PaymentGateway>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_config(store, gateway, publisher, clock, ResaleMarketConfig::default())
    }

    /// Creates a new service with custom configuration.
    #[must_use]
    pub fn with_config(
        store: Arc<dyn MarketplaceStore>,
        gateway: Arc<dyn PaymentGateway>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        config: ResaleMarketConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            publisher,
            clock,
            config,
        }
    }

    /// Returns the active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ResaleMarketConfig {
        &self.config
    }

    /// Lists a ticket for sale.
    ///
    /// The ticket must be owned by `seller`, unencumbered, and attached to
    /// an event that permits resale and has not started. The asking price
    /// is checked against the event's resale cap. On success the listing is
    /// inserted `Active` and the ticket moves to `ListedForSale`, as one
    /// atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when validation, a precondition, or the
    /// store rejects the request.
    pub async fn create_listing(
        &self,
        seller: UserId,
        request: CreateListingRequest,
    ) -> MarketResult<CreateListingResponse> {
        // 1. Validate request
        request.validate().map_err(MarketplaceError::validation)?;

        // 2. Load the ticket and check ownership
        let mut ticket = self
            .store
            .ticket(request.ticket_id)
            .await?
            .ok_or_else(|| MarketplaceError::ticket_not_found(request.ticket_id))?;
        if !ticket.is_owned_by(seller) {
            return Err(MarketplaceError::forbidden(
                "only the ticket owner can list it for sale",
            ));
        }

        // 3. One active listing per ticket
        if self
            .store
            .active_listing_for_ticket(ticket.id())
            .await?
            .is_some()
        {
            return Err(MarketplaceError::policy_violation(
                "this ticket is already listed for sale",
            ));
        }

        // 4. The ticket itself must be free to sell
        if !ticket.is_sellable() {
            return Err(MarketplaceError::invalid_state(format!(
                "ticket cannot be listed while {}",
                ticket.status()
            )));
        }

        // 5. The event must be open for resale
        let event = self
            .store
            .event(ticket.event_id())
            .await?
            .ok_or_else(|| MarketplaceError::event_not_found(ticket.event_id()))?;
        let now = self.clock.now();
        if event.is_cancelled() {
            return Err(MarketplaceError::invalid_state(
                "resale is closed for a cancelled event",
            ));
        }
        if !event.allows_resale() {
            return Err(MarketplaceError::policy_violation(
                "the organizer has not enabled resale for this event",
            ));
        }
        if event.has_started(now) {
            return Err(MarketplaceError::invalid_state(
                "the event has already started",
            ));
        }

        // 6. Enforce the price cap
        let ceiling = max_resale_price(&ticket, &event);
        if !ceiling.permits(request.price) {
            return Err(MarketplaceError::price_exceeds_cap(ceiling));
        }

        // 7. Build the listing and encumber the ticket
        let expires_at = event
            .start_time()
            .sub_hours(LISTING_CLOSES_BEFORE_START_HOURS);
        let listing = TicketListing::new(
            ticket.id(),
            ticket.event_id(),
            seller,
            request.price,
            now,
            expires_at,
        );
        ticket.mark_listed(now)?;

        // 8. Commit both rows atomically
        self.store.create_listing(&listing, &ticket).await?;
        info!(listing_id = %listing.id(), ticket_id = %ticket.id(), "listing created");

        // 9. Publish the domain event
        self.publish(MarketplaceEvent::ListingCreated {
            listing_id: listing.id(),
            ticket_id: listing.ticket_id(),
            event_id: listing.event_id(),
            seller_id: listing.seller_id(),
            price: listing.price(),
        })
        .await;

        Ok(CreateListingResponse::new(
            ListingDetails::from_entity(&listing),
            ceiling,
        ))
    }

    /// Browses listings matching `query`, newest first.
    ///
    /// When the query asks for `Active` rows, rows whose deadline has
    /// already passed are dropped from the result. The stored rows are not
    /// touched; mutating operations flip them when they meet them.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Storage`] if the store query fails.
    pub async fn find_listings(&self, query: ListingQuery) -> MarketResult<Vec<ListingDetails>> {
        let listings = self.store.find_listings(&query).await?;
        let now = self.clock.now();
        Ok(listings
            .iter()
            .filter(|listing| !(listing.is_active() && listing.is_past_deadline(now)))
            .map(ListingDetails::from_entity)
            .collect())
    }

    /// Looks up one listing by ID, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::NotFound`] when the listing is absent.
    pub async fn get_listing(&self, listing_id: ListingId) -> MarketResult<ListingDetails> {
        let listing = self
            .store
            .listing(listing_id)
            .await?
            .ok_or_else(|| MarketplaceError::listing_not_found(listing_id))?;
        Ok(ListingDetails::from_entity(&listing))
    }

    /// Returns all of a seller's listings regardless of status, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Storage`] if the store query fails.
    pub async fn seller_listings(&self, seller: UserId) -> MarketResult<Vec<ListingDetails>> {
        let listings = self.store.listings_by_seller(seller).await?;
        Ok(listings.iter().map(ListingDetails::from_entity).collect())
    }

    /// Changes the asking price of an active listing.
    ///
    /// The new price is validated against the same resale cap as at
    /// creation. An empty change set is a no-op that returns the current
    /// listing.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when validation, a precondition, or the
    /// store rejects the request.
    pub async fn update_listing(
        &self,
        listing_id: ListingId,
        seller: UserId,
        request: UpdateListingRequest,
    ) -> MarketResult<ListingDetails> {
        // 1. Validate request
        request.validate().map_err(MarketplaceError::validation)?;

        // 2. Load the listing and check ownership
        let mut listing = self
            .store
            .listing(listing_id)
            .await?
            .ok_or_else(|| MarketplaceError::listing_not_found(listing_id))?;
        if !listing.is_owned_by(seller) {
            return Err(MarketplaceError::forbidden(
                "only the seller can update a listing",
            ));
        }

        // 3. The listing must still be open
        if !listing.is_active() {
            return Err(MarketplaceError::invalid_state(
                "only active listings can be updated",
            ));
        }
        let now = self.clock.now();
        self.expire_stale_listing(&listing, now).await?;

        // 4. Empty change set: return the current listing untouched
        let Some(new_price) = request.price else {
            return Ok(ListingDetails::from_entity(&listing));
        };

        // 5. Re-validate the new price against the cap
        let ticket = self
            .store
            .ticket(listing.ticket_id())
            .await?
            .ok_or_else(|| MarketplaceError::ticket_not_found(listing.ticket_id()))?;
        let event = self
            .store
            .event(listing.event_id())
            .await?
            .ok_or_else(|| MarketplaceError::event_not_found(listing.event_id()))?;
        let ceiling = max_resale_price(&ticket, &event);
        if !ceiling.permits(new_price) {
            return Err(MarketplaceError::price_exceeds_cap(ceiling));
        }

        // 6. Commit the new price
        listing.reprice(new_price, now)?;
        self.store.reprice_listing(&listing).await?;
        info!(listing_id = %listing.id(), price = %new_price, "listing repriced");

        // 7. Publish the domain event
        self.publish(MarketplaceEvent::ListingRepriced {
            listing_id: listing.id(),
            ticket_id: listing.ticket_id(),
            price: new_price,
        })
        .await;

        Ok(ListingDetails::from_entity(&listing))
    }

    /// Cancels an active listing, releasing the ticket back to the seller.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when a precondition or the store
    /// rejects the request.
    pub async fn cancel_listing(
        &self,
        listing_id: ListingId,
        seller: UserId,
    ) -> MarketResult<ListingDetails> {
        // 1. Load the listing and check ownership
        let mut listing = self
            .store
            .listing(listing_id)
            .await?
            .ok_or_else(|| MarketplaceError::listing_not_found(listing_id))?;
        if !listing.is_owned_by(seller) {
            return Err(MarketplaceError::forbidden(
                "only the seller can cancel a listing",
            ));
        }

        // 2. The listing must still be open
        if !listing.is_active() {
            return Err(MarketplaceError::invalid_state(
                "only active listings can be cancelled",
            ));
        }
        let now = self.clock.now();
        self.expire_stale_listing(&listing, now).await?;

        // 3. Close the listing and release the ticket, atomically
        let mut ticket = self
            .store
            .ticket(listing.ticket_id())
            .await?
            .ok_or_else(|| MarketplaceError::ticket_not_found(listing.ticket_id()))?;
        listing.cancel(now)?;
        ticket.release(now)?;
        self.store.close_listing(&listing, &ticket).await?;
        info!(listing_id = %listing.id(), "listing cancelled");

        // 4. Publish the domain event
        self.publish(MarketplaceEvent::ListingCancelled {
            listing_id: listing.id(),
            ticket_id: listing.ticket_id(),
        })
        .await;

        Ok(ListingDetails::from_entity(&listing))
    }

    /// Starts a purchase by opening a payment intent for the listing.
    ///
    /// Computes the platform fee on top of the asking price and asks the
    /// gateway for an intent carrying the marketplace metadata settlement
    /// needs. Nothing is mutated here; the listing stays `Active` until
    /// [`Self::settle_purchase`] confirms the payment.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when validation, a precondition, or the
    /// gateway rejects the request.
    pub async fn purchase_listing(
        &self,
        listing_id: ListingId,
        buyer: UserId,
        request: PurchaseListingRequest,
    ) -> MarketResult<PurchaseListingResponse> {
        // 1. Validate request
        request.validate().map_err(MarketplaceError::validation)?;
        let contact_email = EmailAddress::new(&request.contact_email)
            .map_err(|e| MarketplaceError::validation(e.to_string()))?;

        // 2. Load the listing; it must still be open
        let listing = self
            .store
            .listing(listing_id)
            .await?
            .ok_or_else(|| MarketplaceError::listing_not_found(listing_id))?;
        if !listing.is_active() {
            return Err(MarketplaceError::invalid_state(
                "only active listings can be purchased",
            ));
        }

        // 3. Sellers cannot buy from themselves
        if listing.is_owned_by(buyer) {
            return Err(MarketplaceError::policy_violation(
                "sellers cannot buy their own listing",
            ));
        }

        // 4. A past-deadline listing expires instead of selling
        let now = self.clock.now();
        self.expire_stale_listing(&listing, now).await?;

        // 5. Compute the charge
        let platform_fee = listing
            .price()
            .percent_round_half_up(self.config.fee_percent)
            .map_err(|e| MarketplaceError::validation(e.to_string()))?;
        let total = listing
            .price()
            .checked_add(platform_fee)
            .map_err(|e| MarketplaceError::validation(e.to_string()))?;

        // 6. Open the payment intent
        let metadata = PaymentMetadata::resale(
            listing.id(),
            listing.ticket_id(),
            listing.event_id(),
            buyer,
            listing.seller_id(),
        );
        let intent = self
            .gateway
            .create_intent(CreateIntentRequest {
                amount: total,
                currency: self.config.currency.clone(),
                receipt_email: contact_email,
                metadata,
            })
            .await?;
        info!(
            listing_id = %listing.id(),
            payment_intent_id = %intent.id,
            amount = total.minor_units(),
            "payment intent opened"
        );

        Ok(PurchaseListingResponse::new(
            ListingDetails::from_entity(&listing),
            PaymentHandle::new(intent.id, intent.client_secret),
            PriceBreakdown::new(listing.price(), platform_fee, total),
        ))
    }

    /// Settles a purchase after the gateway reports the payment succeeded.
    ///
    /// The listing is located from the intent metadata and must still be
    /// `Active`; a repeated settlement call observes `Sold` and fails with
    /// `InvalidState`, which makes this operation safe to drive from a
    /// payment webhook that redelivers. There is no expiry re-check: the
    /// buyer's money is already captured.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the intent has not succeeded, the
    /// listing already settled, or the store rejects the write.
    pub async fn settle_purchase(
        &self,
        request: SettlePurchaseRequest,
    ) -> MarketResult<SettlePurchaseResponse> {
        // 1. Validate request
        request.validate().map_err(MarketplaceError::validation)?;

        // 2. Retrieve the intent; the funds must be captured
        let intent_id = PaymentIntentId::new(request.payment_intent_id.as_str());
        let intent = self.gateway.retrieve_intent(&intent_id).await?;
        if !intent.status.is_succeeded() {
            return Err(MarketplaceError::invalid_state(format!(
                "payment intent {} is {}, not SUCCEEDED",
                intent.id, intent.status
            )));
        }

        // 3. Locate the listing from the intent metadata
        let listing_id = intent.metadata.listing_id;
        let mut listing = self
            .store
            .listing(listing_id)
            .await?
            .ok_or_else(|| MarketplaceError::listing_not_found(listing_id))?;
        if !listing.is_active() {
            return Err(MarketplaceError::invalid_state(format!(
                "listing {} is {}, settlement already happened or it was closed",
                listing.id(),
                listing.status()
            )));
        }

        // 4. Hand the ticket to the buyer
        let buyer = intent.metadata.buyer_id;
        let mut ticket = self
            .store
            .ticket(listing.ticket_id())
            .await?
            .ok_or_else(|| MarketplaceError::ticket_not_found(listing.ticket_id()))?;
        let now = self.clock.now();
        listing.sell(buyer, now)?;
        ticket.hand_over(buyer, now)?;

        // 5. Commit both rows atomically
        self.store.settle_listing(&listing, &ticket).await?;
        info!(
            listing_id = %listing.id(),
            buyer_id = %buyer,
            payment_intent_id = %intent.id,
            "purchase settled"
        );

        // 6. Publish the domain event
        self.publish(MarketplaceEvent::ListingSold {
            listing_id: listing.id(),
            ticket_id: listing.ticket_id(),
            seller_id: listing.seller_id(),
            buyer_id: buyer,
            price: listing.price(),
        })
        .await;

        Ok(SettlePurchaseResponse::new(ListingDetails::from_entity(
            &listing,
        )))
    }

    /// Flips a past-deadline listing to `Expired`, reverts its ticket, and
    /// fails with [`MarketplaceError::Expired`]. No-op for live listings.
    async fn expire_stale_listing(
        &self,
        listing: &TicketListing,
        now: Timestamp,
    ) -> MarketResult<()> {
        if !listing.is_past_deadline(now) {
            return Ok(());
        }
        let mut expired = listing.clone();
        let mut ticket = self
            .store
            .ticket(listing.ticket_id())
            .await?
            .ok_or_else(|| MarketplaceError::ticket_not_found(listing.ticket_id()))?;
        expired.expire(now)?;
        ticket.release(now)?;
        self.store.close_listing(&expired, &ticket).await?;
        info!(listing_id = %expired.id(), "listing expired");

        self.publish(MarketplaceEvent::ListingExpired {
            listing_id: expired.id(),
            ticket_id: expired.ticket_id(),
        })
        .await;

        Err(MarketplaceError::expired("this listing has expired"))
    }

    /// Publishes an event after a committed mutation. Failures are logged
    /// and swallowed; the commit already happened.
    async fn publish(&self, event: MarketplaceEvent) {
        if let Err(e) = self.publisher.publish(&event).await {
            warn!(event = event.name(), error = %e, "event publish failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::error::ErrorKind;
    use crate::application::services::clock::ManualClock;
    use crate::application::services::publisher::RecordingPublisher;
    use crate::domain::entities::{Event, Ticket};
    use crate::domain::value_objects::{
        EventStatus, ListingStatus, Money, TicketStatus, TierId,
    };
    use crate::infrastructure::payments::simulator::{SimulatedGateway, SimulatorConfig};
    use crate::infrastructure::persistence::in_memory::InMemoryMarketplaceStore;

    struct Harness {
        service: ResaleMarketService,
        store: InMemoryMarketplaceStore,
        gateway: Arc<SimulatedGateway>,
        publisher: RecordingPublisher,
        clock: ManualClock,
    }

    fn harness() -> Harness {
        let store = InMemoryMarketplaceStore::new();
        let gateway = Arc::new(SimulatedGateway::new(SimulatorConfig::default()));
        let publisher = RecordingPublisher::new();
        let clock = ManualClock::starting_at(Timestamp::now());
        let service = ResaleMarketService::new(
            Arc::new(store.clone()),
            gateway.clone(),
            Arc::new(publisher.clone()),
            Arc::new(clock.clone()),
        );
        Harness {
            service,
            store,
            gateway,
            publisher,
            clock,
        }
    }

    /// Seeds an event starting in `starts_in_days` and a £100.00 ticket on
    /// it. The event carries no cap scheme, so the 110% default applies.
    async fn seed_ticket(harness: &Harness, owner: UserId, starts_in_days: i64) -> Ticket {
        let event = Event::new("Floorshow", harness.clock.now().add_days(starts_in_days));
        seed_ticket_for_event(harness, owner, &event).await
    }

    async fn seed_ticket_for_event(harness: &Harness, owner: UserId, event: &Event) -> Ticket {
        let ticket = Ticket::new(
            event.id(),
            TierId::new_v4(),
            owner,
            Money::from_minor(10_000).unwrap(),
            Money::from_minor(10_800).unwrap(),
        );
        harness.store.insert_event(event).await.unwrap();
        harness.store.insert_ticket(&ticket).await.unwrap();
        ticket
    }

    fn price(minor: i64) -> Money {
        Money::from_minor(minor).unwrap()
    }

    #[tokio::test]
    async fn create_listing_encumbers_the_ticket() {
        let harness = harness();
        let seller = UserId::new_v4();
        let ticket = seed_ticket(&harness, seller, 30).await;

        let response = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(11_000)))
            .await
            .unwrap();

        assert_eq!(response.listing.status, ListingStatus::Active);
        assert_eq!(response.ceiling.max_price(), Some(price(11_000)));

        let stored = harness.store.ticket(ticket.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), TicketStatus::ListedForSale);
        assert_eq!(harness.publisher.event_names(), vec!["listing_created"]);
    }

    #[tokio::test]
    async fn create_listing_rejects_a_price_over_the_cap() {
        let harness = harness();
        let seller = UserId::new_v4();
        let ticket = seed_ticket(&harness, seller, 30).await;

        let err = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(11_001)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PolicyViolation);
        let message = err.to_string();
        assert!(message.contains("£110.00"));
        assert!(message.contains("110% of face value"));

        // Nothing was written.
        assert_eq!(harness.store.listing_count(), 0);
        let stored = harness.store.ticket(ticket.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), TicketStatus::Valid);
    }

    #[tokio::test]
    async fn create_listing_requires_ownership() {
        let harness = harness();
        let ticket = seed_ticket(&harness, UserId::new_v4(), 30).await;

        let err = harness
            .service
            .create_listing(
                UserId::new_v4(),
                CreateListingRequest::new(ticket.id(), price(9_000)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, MarketplaceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn a_ticket_cannot_be_listed_twice() {
        let harness = harness();
        let seller = UserId::new_v4();
        let ticket = seed_ticket(&harness, seller, 30).await;

        harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(9_000)))
            .await
            .unwrap();

        let err = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(9_000)))
            .await
            .unwrap_err();

        assert!(matches!(err, MarketplaceError::PolicyViolation(_)));
        assert!(err.to_string().contains("already listed for sale"));
    }

    #[tokio::test]
    async fn create_listing_enforces_event_gates() {
        let harness = harness();
        let seller = UserId::new_v4();

        let no_resale = Event::builder("Locked Down", harness.clock.now().add_days(30))
            .allow_resale(false)
            .build();
        let ticket = seed_ticket_for_event(&harness, seller, &no_resale).await;
        let err = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(9_000)))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketplaceError::PolicyViolation(_)));

        let cancelled = Event::builder("Called Off", harness.clock.now().add_days(30))
            .status(EventStatus::Cancelled)
            .build();
        let ticket = seed_ticket_for_event(&harness, seller, &cancelled).await;
        let err = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(9_000)))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketplaceError::InvalidState(_)));

        let started = Event::new("Doors Opened", harness.clock.now().sub_hours(1));
        let ticket = seed_ticket_for_event(&harness, seller, &started).await;
        let err = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(9_000)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already started"));
    }

    #[tokio::test]
    async fn update_listing_reprices_within_the_cap() {
        let harness = harness();
        let seller = UserId::new_v4();
        let ticket = seed_ticket(&harness, seller, 30).await;
        let created = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(11_000)))
            .await
            .unwrap();
        let listing_id = created.listing.id;

        let updated = harness
            .service
            .update_listing(
                listing_id,
                seller,
                UpdateListingRequest::new(Some(price(9_500))),
            )
            .await
            .unwrap();
        assert_eq!(updated.price, price(9_500));

        let over_cap = harness
            .service
            .update_listing(
                listing_id,
                seller,
                UpdateListingRequest::new(Some(price(11_050))),
            )
            .await
            .unwrap_err();
        assert!(matches!(over_cap, MarketplaceError::PriceExceedsCap { .. }));

        // An empty change set neither writes nor publishes.
        let unchanged = harness
            .service
            .update_listing(listing_id, seller, UpdateListingRequest::default())
            .await
            .unwrap();
        assert_eq!(unchanged.price, price(9_500));
        assert_eq!(
            harness.publisher.event_names(),
            vec!["listing_created", "listing_repriced"]
        );
    }

    #[tokio::test]
    async fn cancel_listing_releases_the_ticket() {
        let harness = harness();
        let seller = UserId::new_v4();
        let ticket = seed_ticket(&harness, seller, 30).await;
        let created = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(9_000)))
            .await
            .unwrap();

        let cancelled = harness
            .service
            .cancel_listing(created.listing.id, seller)
            .await
            .unwrap();
        assert_eq!(cancelled.status, ListingStatus::Cancelled);

        let stored = harness.store.ticket(ticket.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), TicketStatus::Valid);

        // A second cancellation finds nothing active.
        let err = harness
            .service
            .cancel_listing(created.listing.id, seller)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn purchase_returns_intent_and_breakdown_without_mutating() {
        let harness = harness();
        let seller = UserId::new_v4();
        let ticket = seed_ticket(&harness, seller, 30).await;
        let created = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(11_000)))
            .await
            .unwrap();

        let buyer = UserId::new_v4();
        let response = harness
            .service
            .purchase_listing(
                created.listing.id,
                buyer,
                PurchaseListingRequest::new("buyer@example.com"),
            )
            .await
            .unwrap();

        // 8% of £110.00 is £8.80.
        assert_eq!(response.breakdown.ticket_price, price(11_000));
        assert_eq!(response.breakdown.platform_fee, price(880));
        assert_eq!(response.breakdown.total_amount, price(11_880));
        assert!(response.payment.client_secret.is_some());
        assert_eq!(harness.gateway.intent_count(), 1);

        // The listing is untouched until settlement.
        let stored = harness
            .store
            .listing(created.listing.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status(), ListingStatus::Active);
    }

    #[tokio::test]
    async fn sellers_cannot_buy_their_own_listing() {
        let harness = harness();
        let seller = UserId::new_v4();
        let ticket = seed_ticket(&harness, seller, 30).await;
        let created = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(9_000)))
            .await
            .unwrap();

        let err = harness
            .service
            .purchase_listing(
                created.listing.id,
                seller,
                PurchaseListingRequest::new("seller@example.com"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MarketplaceError::PolicyViolation(_)));
    }

    #[tokio::test]
    async fn purchase_after_the_deadline_expires_the_listing() {
        let harness = harness();
        let seller = UserId::new_v4();
        let ticket = seed_ticket(&harness, seller, 10).await;
        let created = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(9_000)))
            .await
            .unwrap();

        // One hour before the event, past the two-hour purchase cutoff.
        harness.clock.advance_days(10);
        harness.clock.advance_secs(-3600);

        let err = harness
            .service
            .purchase_listing(
                created.listing.id,
                UserId::new_v4(),
                PurchaseListingRequest::new("buyer@example.com"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Expired);

        let stored = harness
            .store
            .listing(created.listing.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status(), ListingStatus::Expired);
        let stored = harness.store.ticket(ticket.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), TicketStatus::Valid);
        assert_eq!(
            harness.publisher.event_names(),
            vec!["listing_created", "listing_expired"]
        );
        assert_eq!(harness.gateway.intent_count(), 0);
    }

    #[tokio::test]
    async fn find_listings_hides_stale_active_rows() {
        let harness = harness();
        let seller = UserId::new_v4();
        let ticket = seed_ticket(&harness, seller, 10).await;
        let created = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(9_000)))
            .await
            .unwrap();

        let open = harness
            .service
            .find_listings(ListingQuery::default())
            .await
            .unwrap();
        assert_eq!(open.len(), 1);

        harness.clock.advance_days(10);
        let open = harness
            .service
            .find_listings(ListingQuery::default())
            .await
            .unwrap();
        assert!(open.is_empty());

        // Point reads and seller views still show the stored row.
        let found = harness.service.get_listing(created.listing.id).await.unwrap();
        assert_eq!(found.status, ListingStatus::Active);
        let mine = harness.service.seller_listings(seller).await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn settle_purchase_hands_the_ticket_to_the_buyer() {
        let harness = harness();
        let seller = UserId::new_v4();
        let ticket = seed_ticket(&harness, seller, 30).await;
        let created = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(11_000)))
            .await
            .unwrap();

        let buyer = UserId::new_v4();
        let purchase = harness
            .service
            .purchase_listing(
                created.listing.id,
                buyer,
                PurchaseListingRequest::new("buyer@example.com"),
            )
            .await
            .unwrap();

        let intent_id = purchase.payment.payment_intent_id.clone();
        harness.gateway.mark_succeeded(&intent_id).await.unwrap();

        let settled = harness
            .service
            .settle_purchase(SettlePurchaseRequest::new(intent_id.to_string()))
            .await
            .unwrap();
        assert_eq!(settled.listing.status, ListingStatus::Sold);
        assert_eq!(settled.listing.buyer_id, Some(buyer));
        assert!(settled.listing.sold_at.is_some());

        let stored = harness.store.ticket(ticket.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), TicketStatus::Valid);
        assert_eq!(stored.current_owner_id(), buyer);
        assert_eq!(
            harness.publisher.event_names(),
            vec!["listing_created", "listing_sold"]
        );

        // Settlement is idempotent: a redelivered webhook observes Sold.
        let err = harness
            .service
            .settle_purchase(SettlePurchaseRequest::new(intent_id.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn settlement_requires_a_succeeded_intent() {
        let harness = harness();
        let seller = UserId::new_v4();
        let ticket = seed_ticket(&harness, seller, 30).await;
        let created = harness
            .service
            .create_listing(seller, CreateListingRequest::new(ticket.id(), price(9_000)))
            .await
            .unwrap();

        let purchase = harness
            .service
            .purchase_listing(
                created.listing.id,
                UserId::new_v4(),
                PurchaseListingRequest::new("buyer@example.com"),
            )
            .await
            .unwrap();

        let err = harness
            .service
            .settle_purchase(SettlePurchaseRequest::new(
                purchase.payment.payment_intent_id.to_string(),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(err.to_string().contains("not SUCCEEDED"));
    }
}
