//! # Application Errors
//!
//! The service-level error taxonomy. Every marketplace operation fails
//! with a [`MarketplaceError`], and each error carries an [`ErrorKind`]
//! that transport layers map to status codes without inspecting messages.

use crate::domain::errors::DomainError;
use crate::domain::services::resale_pricing::ResaleCeiling;
use crate::domain::value_objects::{
    EventId, ListingId, TicketId, TransferId, TransferToken, UserId,
};
use crate::infrastructure::payments::PaymentError;
use crate::infrastructure::persistence::traits::StoreError;
use std::fmt;
use thiserror::Error;

/// Marketplace operation error.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The caller is not allowed to act on this entity.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The entity's current state does not permit the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A marketplace rule forbids the request outright.
    #[error("policy violation: {0}")]
    PolicyViolation(String),

    /// The asking price exceeds the event's resale cap.
    #[error("asking price exceeds the resale cap: maximum allowed is {ceiling}")]
    PriceExceedsCap {
        /// The governing ceiling, carrying the branch description and the
        /// maximum in major units for the message.
        ceiling: ResaleCeiling,
    },

    /// The listing or transfer deadline has passed. Raising this implies
    /// the expired row was already flipped and the ticket released.
    #[error("expired: {0}")]
    Expired(String),

    /// Malformed or out-of-range input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Entity-level rule failure raised by an aggregate.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Store failure that is not a typed precondition conflict.
    #[error("storage error: {0}")]
    Storage(String),

    /// Payment gateway failure.
    #[error("payment gateway error: {0}")]
    Payment(#[from] PaymentError),
}

/// Classification used by transport layers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced entity is absent.
    NotFound,
    /// Authenticated caller lacks the right to act.
    Forbidden,
    /// Entity state does not permit the operation.
    InvalidState,
    /// A marketplace rule rejected the request.
    PolicyViolation,
    /// A deadline passed before the operation.
    Expired,
    /// Malformed input.
    Validation,
    /// Store or gateway failure.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidState => "INVALID_STATE",
            Self::PolicyViolation => "POLICY_VIOLATION",
            Self::Expired => "EXPIRED",
            Self::Validation => "VALIDATION",
            Self::Internal => "INTERNAL",
        };
        write!(f, "{name}")
    }
}

impl MarketplaceError {
    /// Returns the kind transport layers map to status codes.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::PolicyViolation(_) | Self::PriceExceedsCap { .. } => ErrorKind::PolicyViolation,
            Self::Expired(_) => ErrorKind::Expired,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Domain(inner) => {
                if inner.is_state_error() {
                    ErrorKind::InvalidState
                } else {
                    ErrorKind::Validation
                }
            }
            Self::Storage(_) | Self::Payment(_) => ErrorKind::Internal,
        }
    }

    /// Creates a ticket not found error.
    #[must_use]
    pub fn ticket_not_found(id: TicketId) -> Self {
        Self::NotFound(format!("ticket not found: {id}"))
    }

    /// Creates a listing not found error.
    #[must_use]
    pub fn listing_not_found(id: ListingId) -> Self {
        Self::NotFound(format!("listing not found: {id}"))
    }

    /// Creates a transfer not found error.
    #[must_use]
    pub fn transfer_not_found(id: TransferId) -> Self {
        Self::NotFound(format!("transfer not found: {id}"))
    }

    /// Creates a transfer not found error for a token lookup.
    #[must_use]
    pub fn transfer_token_not_found(token: &TransferToken) -> Self {
        Self::NotFound(format!("transfer not found for token: {token}"))
    }

    /// Creates an event not found error.
    #[must_use]
    pub fn event_not_found(id: EventId) -> Self {
        Self::NotFound(format!("event not found: {id}"))
    }

    /// Creates a user not found error.
    #[must_use]
    pub fn user_not_found(id: UserId) -> Self {
        Self::NotFound(format!("user not found: {id}"))
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates an invalid state error.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates a policy violation error.
    #[must_use]
    pub fn policy_violation(message: impl Into<String>) -> Self {
        Self::PolicyViolation(message.into())
    }

    /// Creates a price-cap violation carrying the governing ceiling.
    #[must_use]
    pub const fn price_exceeds_cap(ceiling: ResaleCeiling) -> Self {
        Self::PriceExceedsCap { ceiling }
    }

    /// Creates an expired error.
    #[must_use]
    pub fn expired(message: impl Into<String>) -> Self {
        Self::Expired(message.into())
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a storage error.
    #[must_use]
    pub fn storage(message: impl fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }
}

impl From<StoreError> for MarketplaceError {
    /// Store conflicts surface as state errors; anything else is internal.
    /// Composite mutations re-check their preconditions in-transaction, so
    /// a conflict here means a concurrent writer won the race.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::PreconditionFailed(message) => Self::InvalidState(message),
            StoreError::Connection(_) | StoreError::Query(_) => Self::Storage(err.to_string()),
        }
    }
}

/// Result type for marketplace operations.
pub type MarketResult<T> = Result<T, MarketplaceError>;
