//! # Transfer Token
//!
//! Globally unique, URL-safe tokens identifying a transfer from the
//! outside. The token is the external lookup key: recipients receive it in
//! a shareable link and never see the transfer id.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A globally unique transfer token.
///
/// Generated as 64 hex characters (two concatenated v4 UUIDs), giving 256
/// bits of material so the token is unguessable as well as unique.
///
/// # Examples
///
/// ```
/// use boxoffice::domain::value_objects::transfer_token::TransferToken;
///
/// let token = TransferToken::generate();
/// assert_eq!(token.as_str().len(), 64);
/// assert_ne!(token, TransferToken::generate());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferToken(String);

impl TransferToken {
    /// Generates a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ))
    }

    /// Reconstructs a token from storage or a request path.
    ///
    /// Tokens are opaque at the boundary; an unknown token simply fails the
    /// lookup.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns the inner string.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TransferToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TransferToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for TransferToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}
