//! # Domain Errors
//!
//! Typed domain error definitions.
//!
//! This module provides the [`DomainError`] enum for representing
//! domain-level errors with numeric error codes.
//!
//! # Error Code Ranges
//!
//! - **1000-1999**: Validation errors
//! - **2000-2999**: State errors
//!
//! # Examples
//!
//! ```
//! use boxoffice::domain::errors::DomainError;
//!
//! let error = DomainError::InvalidPrice("price must be positive".to_string());
//! assert_eq!(error.code(), 1001);
//! ```

use crate::domain::value_objects::{ListingStatus, TicketStatus, TransferStatus};
use thiserror::Error;

/// Domain-level error with numeric error codes.
///
/// Raised by entity methods when a lifecycle rule is violated, and by value
/// object construction during validation. The application layer translates
/// these into caller-facing rejection kinds.
///
/// # Error Code Ranges
///
/// | Range | Category |
/// |-------|----------|
/// | 1000-1999 | Validation errors |
/// | 2000-2999 | State errors |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (1000-1999)
    // ========================================================================
    /// Invalid price or money amount.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Invalid email address.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// Generic validation error.
    #[error("validation error: {0}")]
    ValidationError(String),

    // ========================================================================
    // State Errors (2000-2999)
    // ========================================================================
    /// Invalid ticket status transition attempted.
    #[error("cannot move ticket from {from} to {to}")]
    InvalidTicketTransition {
        /// The current status.
        from: TicketStatus,
        /// The attempted target status.
        to: TicketStatus,
    },

    /// Invalid listing status transition attempted.
    #[error("cannot move listing from {from} to {to}")]
    InvalidListingTransition {
        /// The current status.
        from: ListingStatus,
        /// The attempted target status.
        to: ListingStatus,
    },

    /// Invalid transfer status transition attempted.
    #[error("cannot move transfer from {from} to {to}")]
    InvalidTransferTransition {
        /// The current status.
        from: TransferStatus,
        /// The attempted target status.
        to: TransferStatus,
    },
}

impl DomainError {
    /// Returns the numeric error code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidPrice(_) => 1001,
            Self::InvalidEmail(_) => 1002,
            Self::ValidationError(_) => 1999,
            Self::InvalidTicketTransition { .. } => 2001,
            Self::InvalidListingTransition { .. } => 2002,
            Self::InvalidTransferTransition { .. } => 2003,
        }
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.code() {
            1000..=1999 => "validation",
            _ => "state",
        }
    }

    /// Returns true if this is a validation error.
    #[inline]
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        self.code() >= 1000 && self.code() < 2000
    }

    /// Returns true if this is a state error.
    #[inline]
    #[must_use]
    pub const fn is_state_error(&self) -> bool {
        self.code() >= 2000 && self.code() < 3000
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
