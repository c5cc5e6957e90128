//! # Ticket Transfer Aggregate
//!
//! A free hand-off of one ticket to a recipient addressed by email.
//!
//! The recipient needs no account at initiation time; the transfer is
//! claimable through an unguessable [`TransferToken`] until it resolves or
//! its deadline passes. A transfer is created `Pending` and ends in
//! exactly one terminal state: `Accepted`, `Rejected`, `Cancelled` by the
//! sender, or `Expired`.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    EmailAddress, TicketId, TransferId, TransferStatus, TransferToken, UserId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pending or resolved ticket hand-off.
///
/// # Invariants
///
/// - Status transitions follow [`TransferStatus`] rules
/// - `receiver_id` and `accepted_at` are set exactly when the transfer is
///   `Accepted`
/// - The recipient email is stored normalized (trimmed, lowercased)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketTransfer {
    /// Unique identifier for this transfer.
    id: TransferId,
    /// The ticket being handed off.
    ticket_id: TicketId,
    /// The current owner initiating the hand-off.
    sender_id: UserId,
    /// The receiving account: a tentative link while `Pending`, definitive
    /// once `Accepted`.
    receiver_id: Option<UserId>,
    /// Where the claim invitation was addressed.
    recipient_email: EmailAddress,
    /// Unguessable claim token embedded in the shareable link.
    token: TransferToken,
    /// Optional note from the sender to the recipient.
    message: Option<String>,
    /// Current lifecycle status.
    status: TransferStatus,
    /// When this transfer was created.
    created_at: Timestamp,
    /// When this transfer was last updated.
    updated_at: Timestamp,
    /// Deadline after which the transfer can no longer be claimed.
    expires_at: Timestamp,
    /// When the recipient accepted, if they did.
    accepted_at: Option<Timestamp>,
}

impl TicketTransfer {
    /// Creates a new `Pending` transfer with a freshly generated token.
    ///
    /// `tentative_receiver_id` links an existing account holding the
    /// recipient email, purely as a hint; [`Self::accept`] resolves the
    /// receiver definitively from the responder. The caller supplies both
    /// timestamps: `created_at` from its clock and `expires_at` from the
    /// configured claim window.
    #[must_use]
    pub fn new(
        ticket_id: TicketId,
        sender_id: UserId,
        recipient_email: EmailAddress,
        tentative_receiver_id: Option<UserId>,
        message: Option<String>,
        created_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            id: TransferId::new_v4(),
            ticket_id,
            sender_id,
            receiver_id: tentative_receiver_id,
            recipient_email,
            token: TransferToken::generate(),
            message,
            status: TransferStatus::Pending,
            created_at,
            updated_at: created_at,
            expires_at,
            accepted_at: None,
        }
    }

    /// Reconstructs a transfer from storage.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: TransferId,
        ticket_id: TicketId,
        sender_id: UserId,
        receiver_id: Option<UserId>,
        recipient_email: EmailAddress,
        token: TransferToken,
        message: Option<String>,
        status: TransferStatus,
        created_at: Timestamp,
        updated_at: Timestamp,
        expires_at: Timestamp,
        accepted_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            ticket_id,
            sender_id,
            receiver_id,
            recipient_email,
            token,
            message,
            status,
            created_at,
            updated_at,
            expires_at,
            accepted_at,
        }
    }

    // ========== Lifecycle ==========

    /// Accepts the transfer on behalf of `receiver_id`, recording when.
    /// Any tentative receiver link is replaced by the responder.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransferTransition`] unless the
    /// transfer is `Pending`.
    pub fn accept(&mut self, receiver_id: UserId, now: Timestamp) -> DomainResult<()> {
        self.transition_to(TransferStatus::Accepted, now)?;
        self.receiver_id = Some(receiver_id);
        self.accepted_at = Some(now);
        Ok(())
    }

    /// Rejects the transfer, leaving the ticket with the sender.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransferTransition`] unless the
    /// transfer is `Pending`.
    pub fn reject(&mut self, now: Timestamp) -> DomainResult<()> {
        self.transition_to(TransferStatus::Rejected, now)
    }

    /// Cancels the transfer at the sender's request.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransferTransition`] unless the
    /// transfer is `Pending`.
    pub fn cancel(&mut self, now: Timestamp) -> DomainResult<()> {
        self.transition_to(TransferStatus::Cancelled, now)
    }

    /// Marks the transfer expired after its deadline passed.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransferTransition`] unless the
    /// transfer is `Pending`.
    pub fn expire(&mut self, now: Timestamp) -> DomainResult<()> {
        self.transition_to(TransferStatus::Expired, now)
    }

    fn transition_to(&mut self, target: TransferStatus, now: Timestamp) -> DomainResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidTransferTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    // ========== Accessors ==========

    /// Returns the transfer ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TransferId {
        self.id
    }

    /// Returns the ticket ID.
    #[inline]
    #[must_use]
    pub fn ticket_id(&self) -> TicketId {
        self.ticket_id
    }

    /// Returns the sender's user ID.
    #[inline]
    #[must_use]
    pub fn sender_id(&self) -> UserId {
        self.sender_id
    }

    /// Returns the linked receiver: tentative while pending, definitive
    /// once accepted.
    #[inline]
    #[must_use]
    pub fn receiver_id(&self) -> Option<UserId> {
        self.receiver_id
    }

    /// Returns the recipient email the invitation was addressed to.
    #[inline]
    #[must_use]
    pub fn recipient_email(&self) -> &EmailAddress {
        &self.recipient_email
    }

    /// Returns the claim token.
    #[inline]
    #[must_use]
    pub fn token(&self) -> &TransferToken {
        &self.token
    }

    /// Returns the sender's note, if any.
    #[inline]
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the current status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> TransferStatus {
        self.status
    }

    /// Returns when this transfer was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns when this transfer was last updated.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Returns the claim deadline.
    #[inline]
    #[must_use]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Returns when the recipient accepted, if they did.
    #[inline]
    #[must_use]
    pub fn accepted_at(&self) -> Option<Timestamp> {
        self.accepted_at
    }

    // ========== State Helpers ==========

    /// Returns true if the transfer is still awaiting a response.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Returns true if `user_id` initiated this transfer.
    #[inline]
    #[must_use]
    pub fn is_sent_by(&self, user_id: UserId) -> bool {
        self.sender_id == user_id
    }

    /// Returns true if the invitation was addressed to `email`. Both sides
    /// are normalized, so equality is exact.
    #[inline]
    #[must_use]
    pub fn is_addressed_to(&self, email: &EmailAddress) -> bool {
        self.recipient_email == *email
    }

    /// Returns true if the deadline has passed, regardless of stored
    /// status. Stale `Pending` rows are flipped lazily by the services.
    #[inline]
    #[must_use]
    pub fn is_past_deadline(&self, now: Timestamp) -> bool {
        now.is_after(self.expires_at)
    }
}

impl fmt::Display for TicketTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer {{ id: {}, ticket: {}, to: {}, status: {} }}",
            self.id, self.ticket_id, self.recipient_email, self.status
        )
    }
}
