//! # User Reference Data
//!
//! The slice of an account the marketplace needs: a stable ID and a
//! verified email for matching transfer invitations. Account management
//! lives outside this core; users arrive through the directory port.

use crate::domain::value_objects::{EmailAddress, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A platform account as seen by the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable account identifier.
    id: UserId,
    /// Verified email address, stored normalized.
    email: EmailAddress,
    /// Display name.
    name: String,
}

impl User {
    /// Creates a user record with an already-assigned ID.
    #[must_use]
    pub fn new(id: UserId, email: EmailAddress, name: impl Into<String>) -> Self {
        Self {
            id,
            email,
            name: name.into(),
        }
    }

    // ========== Accessors ==========

    /// Returns the account ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the verified email address.
    #[inline]
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the display name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
