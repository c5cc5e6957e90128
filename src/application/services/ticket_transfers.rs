//! # Ticket Transfer Service
//!
//! Orchestrates peer-to-peer ticket gifting: a sender invites a recipient
//! by email, the recipient claims the invitation through a tokenized link
//! and accepts or rejects it, and the sender can cancel while it is still
//! pending.
//!
//! The recipient is identified by email, not account ID: an invitation can
//! be sent to someone with no account yet. A tentative receiver is linked
//! at creation when an account with that email already exists, but the
//! binding decision happens at accept time against the responder's
//! verified email. Expiry follows the same lazy wall-clock rule as
//! listings: mutating operations flip a lapsed invitation to `Expired`,
//! revert the ticket, and fail with [`MarketplaceError::Expired`].

use crate::application::dto::transfer_dto::{
    CreateTransferRequest, CreateTransferResponse, GetTransferResponse, RespondToTransferRequest,
    RespondToTransferResponse, TransferDetails, UserTransfersResponse,
};
use crate::application::error::{MarketResult, MarketplaceError};
use crate::application::services::clock::Clock;
use crate::application::services::publisher::EventPublisher;
use crate::domain::entities::TicketTransfer;
use crate::domain::events::MarketplaceEvent;
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    EmailAddress, TransferId, TransferResponse, TransferStatus, TransferToken, UserId,
};
use crate::infrastructure::persistence::traits::{MarketplaceStore, UserDirectory};
use std::sync::Arc;
use tracing::{info, warn};

/// Default number of days a transfer invitation stays open.
const DEFAULT_EXPIRY_DAYS: i64 = 7;

/// Configuration for ticket transfers.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Days before a pending invitation lapses.
    pub expiry_days: i64,
    /// Base URL the shareable claim link is built from.
    pub claim_link_base_url: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            expiry_days: DEFAULT_EXPIRY_DAYS,
            claim_link_base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Application service for ticket transfers.
#[derive(Debug)]
pub struct TicketTransferService {
    store: Arc<dyn MarketplaceStore>,
    users: Arc<dyn UserDirectory>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    config: TransferConfig,
}

impl TicketTransferService {
    /// Creates a new service with default configuration.
    #[must_use]
    pub fn new(
        store: Arc<dyn MarketplaceStore>,
        users: Arc<dyn UserDirectory>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_config(store, users, publisher, clock, TransferConfig::default())
    }

    /// Creates a new service with custom configuration.
    #[must_use]
    pub fn with_config(
        store: Arc<dyn MarketplaceStore>,
        users: Arc<dyn UserDirectory>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        config: TransferConfig,
    ) -> Self {
        Self {
            store,
            users,
            publisher,
            clock,
            config,
        }
    }

    /// Returns the active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Invites someone to take over a ticket.
    ///
    /// The ticket must be owned by `sender`, unencumbered, and attached to
    /// an event that is neither cancelled nor started. On success the
    /// transfer is inserted `Pending` with a fresh claim token and the
    /// ticket moves to `PendingTransfer`, as one atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when validation, a precondition, or the
    /// store rejects the request.
    pub async fn create_transfer(
        &self,
        sender: UserId,
        request: CreateTransferRequest,
    ) -> MarketResult<CreateTransferResponse> {
        // 1. Validate request
        request.validate().map_err(MarketplaceError::validation)?;
        let recipient_email = EmailAddress::new(&request.recipient_email)
            .map_err(|e| MarketplaceError::validation(e.to_string()))?;

        // 2. Load the ticket and check ownership
        let mut ticket = self
            .store
            .ticket(request.ticket_id)
            .await?
            .ok_or_else(|| MarketplaceError::ticket_not_found(request.ticket_id))?;
        if !ticket.is_owned_by(sender) {
            return Err(MarketplaceError::forbidden(
                "only the ticket owner can transfer it",
            ));
        }

        // 3. One pending transfer per ticket
        if self
            .store
            .pending_transfer_for_ticket(ticket.id())
            .await?
            .is_some()
        {
            return Err(MarketplaceError::policy_violation(
                "this ticket already has a pending transfer",
            ));
        }

        // 4. The ticket itself must be free to hand over
        if !ticket.is_sellable() {
            return Err(MarketplaceError::invalid_state(format!(
                "ticket cannot be transferred while {}",
                ticket.status()
            )));
        }

        // 5. The event must still lie ahead
        let event = self
            .store
            .event(ticket.event_id())
            .await?
            .ok_or_else(|| MarketplaceError::event_not_found(ticket.event_id()))?;
        let now = self.clock.now();
        if event.is_cancelled() {
            return Err(MarketplaceError::invalid_state(
                "transfers are closed for a cancelled event",
            ));
        }
        if event.has_started(now) {
            return Err(MarketplaceError::invalid_state(
                "the event has already started",
            ));
        }

        // 6. No transfers to yourself
        let sender_account = self
            .users
            .find_by_id(sender)
            .await?
            .ok_or_else(|| MarketplaceError::user_not_found(sender))?;
        if *sender_account.email() == recipient_email {
            return Err(MarketplaceError::policy_violation(
                "tickets cannot be transferred to your own email address",
            ));
        }

        // 7. Link a tentative receiver when the email has an account
        let tentative_receiver = self
            .users
            .find_by_email(&recipient_email)
            .await?
            .map(|user| user.id());

        // 8. Build the transfer and encumber the ticket
        let transfer = TicketTransfer::new(
            ticket.id(),
            sender,
            recipient_email,
            tentative_receiver,
            request.message,
            now,
            now.add_days(self.config.expiry_days),
        );
        ticket.mark_pending_transfer(now)?;

        // 9. Commit both rows atomically
        self.store.create_transfer(&transfer, &ticket).await?;
        info!(transfer_id = %transfer.id(), ticket_id = %ticket.id(), "transfer created");

        // 10. Publish the domain event
        self.publish(MarketplaceEvent::TransferCreated {
            transfer_id: transfer.id(),
            ticket_id: transfer.ticket_id(),
            sender_id: transfer.sender_id(),
            recipient_email: transfer.recipient_email().clone(),
        })
        .await;

        let claim_link = self.claim_link(transfer.token());
        Ok(CreateTransferResponse::new(
            TransferDetails::from_entity(&transfer),
            claim_link,
        ))
    }

    /// Looks up a transfer by its claim token.
    ///
    /// The response carries an `expired` flag computed against the current
    /// clock, so a recipient following a stale link sees the truth even
    /// though the stored row has not been flipped yet.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::NotFound`] when no transfer carries the
    /// token.
    pub async fn get_transfer_by_token(
        &self,
        token: &TransferToken,
    ) -> MarketResult<GetTransferResponse> {
        let transfer = self
            .store
            .transfer_by_token(token)
            .await?
            .ok_or_else(|| MarketplaceError::transfer_token_not_found(token))?;
        let now = self.clock.now();
        let expired = transfer.status() == TransferStatus::Expired
            || (transfer.is_pending() && transfer.is_past_deadline(now));
        Ok(GetTransferResponse::new(
            TransferDetails::from_entity(&transfer),
            expired,
        ))
    }

    /// Accepts or rejects a pending transfer on behalf of `responder`.
    ///
    /// The responder's verified account email must match the invitation's
    /// recipient email; whoever holds the link but not the mailbox is
    /// turned away. Acceptance hands the ticket over; rejection releases it
    /// back to the sender.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when a precondition or the store
    /// rejects the request.
    pub async fn respond_to_transfer(
        &self,
        token: &TransferToken,
        responder: UserId,
        request: RespondToTransferRequest,
    ) -> MarketResult<RespondToTransferResponse> {
        // 1. Load the transfer; it must still be open
        let mut transfer = self
            .store
            .transfer_by_token(token)
            .await?
            .ok_or_else(|| MarketplaceError::transfer_token_not_found(token))?;
        if !transfer.is_pending() {
            return Err(MarketplaceError::invalid_state(format!(
                "this transfer was already {}",
                transfer.status()
            )));
        }
        let now = self.clock.now();
        self.expire_stale_transfer(&transfer, now).await?;

        // 2. The responder must hold the invited mailbox
        let account = self
            .users
            .find_by_id(responder)
            .await?
            .ok_or_else(|| MarketplaceError::user_not_found(responder))?;
        if !transfer.is_addressed_to(account.email()) {
            return Err(MarketplaceError::forbidden(
                "you are not the intended recipient of this transfer",
            ));
        }

        // 3. Resolve the invitation
        let mut ticket = self
            .store
            .ticket(transfer.ticket_id())
            .await?
            .ok_or_else(|| MarketplaceError::ticket_not_found(transfer.ticket_id()))?;
        match request.response {
            TransferResponse::Accept => {
                transfer.accept(responder, now)?;
                ticket.hand_over(responder, now)?;
                self.store.accept_transfer(&transfer, &ticket).await?;
            }
            TransferResponse::Reject => {
                transfer.reject(now)?;
                ticket.release(now)?;
                self.store.close_transfer(&transfer, &ticket).await?;
            }
        }
        info!(
            transfer_id = %transfer.id(),
            response = %request.response,
            "transfer resolved"
        );

        // 4. Publish the domain event
        self.publish(MarketplaceEvent::TransferResponded {
            transfer_id: transfer.id(),
            ticket_id: transfer.ticket_id(),
            response: request.response,
            receiver_id: transfer.receiver_id(),
        })
        .await;

        Ok(RespondToTransferResponse::new(TransferDetails::from_entity(
            &transfer,
        )))
    }

    /// Returns the caller's transfer activity in both directions.
    ///
    /// Sent transfers match the caller's account ID; received transfers
    /// match the caller's verified email address from the user directory.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the caller's account is unknown or
    /// a store query fails.
    pub async fn user_transfers(&self, caller: UserId) -> MarketResult<UserTransfersResponse> {
        let account = self
            .users
            .find_by_id(caller)
            .await?
            .ok_or_else(|| MarketplaceError::user_not_found(caller))?;

        let sent = self.store.transfers_by_sender(caller).await?;
        let received = self
            .store
            .transfers_by_recipient_email(account.email())
            .await?;

        Ok(UserTransfersResponse::new(
            sent.iter().map(TransferDetails::from_entity).collect(),
            received.iter().map(TransferDetails::from_entity).collect(),
        ))
    }

    /// Withdraws a pending invitation, releasing the ticket.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when a precondition or the store
    /// rejects the request.
    pub async fn cancel_transfer(
        &self,
        transfer_id: TransferId,
        sender: UserId,
    ) -> MarketResult<TransferDetails> {
        // 1. Load the transfer and check ownership
        let mut transfer = self
            .store
            .transfer(transfer_id)
            .await?
            .ok_or_else(|| MarketplaceError::transfer_not_found(transfer_id))?;
        if !transfer.is_sent_by(sender) {
            return Err(MarketplaceError::forbidden(
                "only the sender can cancel a transfer",
            ));
        }

        // 2. The transfer must still be open
        if !transfer.is_pending() {
            return Err(MarketplaceError::invalid_state(
                "only pending transfers can be cancelled",
            ));
        }
        let now = self.clock.now();
        self.expire_stale_transfer(&transfer, now).await?;

        // 3. Close the transfer and release the ticket, atomically
        let mut ticket = self
            .store
            .ticket(transfer.ticket_id())
            .await?
            .ok_or_else(|| MarketplaceError::ticket_not_found(transfer.ticket_id()))?;
        transfer.cancel(now)?;
        ticket.release(now)?;
        self.store.close_transfer(&transfer, &ticket).await?;
        info!(transfer_id = %transfer.id(), "transfer cancelled");

        // 4. Publish the domain event
        self.publish(MarketplaceEvent::TransferCancelled {
            transfer_id: transfer.id(),
            ticket_id: transfer.ticket_id(),
        })
        .await;

        Ok(TransferDetails::from_entity(&transfer))
    }

    /// Builds the shareable claim link for a token.
    fn claim_link(&self, token: &TransferToken) -> String {
        format!(
            "{}/transfers/claim/{}",
            self.config.claim_link_base_url.trim_end_matches('/'),
            token
        )
    }

    /// Flips a past-deadline transfer to `Expired`, reverts its ticket, and
    /// fails with [`MarketplaceError::Expired`]. No-op for live transfers.
    async fn expire_stale_transfer(
        &self,
        transfer: &TicketTransfer,
        now: Timestamp,
    ) -> MarketResult<()> {
        if !transfer.is_past_deadline(now) {
            return Ok(());
        }
        let mut expired = transfer.clone();
        let mut ticket = self
            .store
            .ticket(transfer.ticket_id())
            .await?
            .ok_or_else(|| MarketplaceError::ticket_not_found(transfer.ticket_id()))?;
        expired.expire(now)?;
        ticket.release(now)?;
        self.store.close_transfer(&expired, &ticket).await?;
        info!(transfer_id = %expired.id(), "transfer expired");

        self.publish(MarketplaceEvent::TransferExpired {
            transfer_id: expired.id(),
            ticket_id: expired.ticket_id(),
        })
        .await;

        Err(MarketplaceError::expired(
            "this transfer invitation has expired",
        ))
    }

    /// Publishes an event after a committed mutation. Failures are logged
    /// and swallowed; the commit already happened.
    async fn publish(&self, event: MarketplaceEvent) {
        if let Err(e) = self.publisher.publish(&event).await {
            warn!(event = event.name(), error = %e, "event publish failed");
        }
    }
}
