//! # Transfer DTOs
//!
//! Data transfer objects for ticket transfer operations.

use crate::domain::entities::TicketTransfer;
use crate::domain::value_objects::{
    EmailAddress, TicketId, Timestamp, TransferId, TransferResponse, TransferStatus, TransferToken,
    UserId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted personal message, in characters.
const MAX_MESSAGE_CHARS: usize = 500;

/// Request to transfer a ticket to a recipient email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransferRequest {
    /// The ticket to hand over.
    pub ticket_id: TicketId,
    /// Where the claim invitation goes.
    pub recipient_email: String,
    /// Optional personal message shown to the recipient.
    pub message: Option<String>,
}

impl CreateTransferRequest {
    /// Creates a new `CreateTransferRequest`.
    #[must_use]
    pub fn new(
        ticket_id: TicketId,
        recipient_email: impl Into<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            ticket_id,
            recipient_email: recipient_email.into(),
            message,
        }
    }

    /// Validates the request fields.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.recipient_email.trim().is_empty() {
            return Err("recipient_email cannot be empty".to_string());
        }

        if let Some(message) = &self.message
            && message.chars().count() > MAX_MESSAGE_CHARS
        {
            return Err(format!(
                "message cannot exceed {MAX_MESSAGE_CHARS} characters"
            ));
        }

        Ok(())
    }
}

impl fmt::Display for CreateTransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CreateTransferRequest {{ ticket: {}, recipient: {} }}",
            self.ticket_id, self.recipient_email
        )
    }
}

/// A transfer as returned to API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDetails {
    /// Transfer ID.
    pub id: TransferId,
    /// The ticket being handed over.
    pub ticket_id: TicketId,
    /// The sending user.
    pub sender_id: UserId,
    /// The receiving user, definitive once accepted.
    pub receiver_id: Option<UserId>,
    /// The invited recipient's email.
    pub recipient_email: EmailAddress,
    /// Claim token for the shareable link.
    pub token: TransferToken,
    /// Personal message from the sender.
    pub message: Option<String>,
    /// Current transfer status.
    pub status: TransferStatus,
    /// When the transfer was created.
    pub created_at: Timestamp,
    /// When the invitation lapses.
    pub expires_at: Timestamp,
    /// When the recipient accepted, if they did.
    pub accepted_at: Option<Timestamp>,
}

impl TransferDetails {
    /// Builds the view from a domain transfer.
    #[must_use]
    pub fn from_entity(transfer: &TicketTransfer) -> Self {
        Self {
            id: transfer.id(),
            ticket_id: transfer.ticket_id(),
            sender_id: transfer.sender_id(),
            receiver_id: transfer.receiver_id(),
            recipient_email: transfer.recipient_email().clone(),
            token: transfer.token().clone(),
            message: transfer.message().map(ToString::to_string),
            status: transfer.status(),
            created_at: transfer.created_at(),
            expires_at: transfer.expires_at(),
            accepted_at: transfer.accepted_at(),
        }
    }
}

/// Response after creating a transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransferResponse {
    /// The created transfer.
    pub transfer: TransferDetails,
    /// Shareable link the recipient uses to claim the ticket.
    pub claim_link: String,
}

impl CreateTransferResponse {
    /// Creates a new `CreateTransferResponse`.
    #[must_use]
    pub fn new(transfer: TransferDetails, claim_link: impl Into<String>) -> Self {
        Self {
            transfer,
            claim_link: claim_link.into(),
        }
    }
}

/// Response for a token lookup.
///
/// `expired` is computed against the clock at read time; consumers must
/// not trust the stored status alone, because expiry is only persisted
/// when a mutating operation touches the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTransferResponse {
    /// The transfer behind the token.
    pub transfer: TransferDetails,
    /// True if the invitation has lapsed, whatever the stored status.
    pub expired: bool,
}

impl GetTransferResponse {
    /// Creates a new `GetTransferResponse`.
    #[must_use]
    pub fn new(transfer: TransferDetails, expired: bool) -> Self {
        Self { transfer, expired }
    }
}

/// Request to accept or reject a pending transfer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RespondToTransferRequest {
    /// The recipient's answer.
    pub response: TransferResponse,
}

impl RespondToTransferRequest {
    /// Creates a new `RespondToTransferRequest`.
    #[must_use]
    pub fn new(response: TransferResponse) -> Self {
        Self { response }
    }
}

impl fmt::Display for RespondToTransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RespondToTransferRequest {{ {} }}", self.response)
    }
}

/// Response after answering a transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondToTransferResponse {
    /// The transfer in its resolved state.
    pub transfer: TransferDetails,
}

impl RespondToTransferResponse {
    /// Creates a new `RespondToTransferResponse`.
    #[must_use]
    pub fn new(transfer: TransferDetails) -> Self {
        Self { transfer }
    }
}

/// A user's transfer activity, both directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTransfersResponse {
    /// Transfers the user sent, newest first.
    pub sent: Vec<TransferDetails>,
    /// Transfers addressed to the user's email, newest first.
    pub received: Vec<TransferDetails>,
}

impl UserTransfersResponse {
    /// Creates a new `UserTransfersResponse`.
    #[must_use]
    pub fn new(sent: Vec<TransferDetails>, received: Vec<TransferDetails>) -> Self {
        Self { sent, received }
    }
}
