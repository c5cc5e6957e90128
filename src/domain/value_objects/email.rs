//! # Email Address Value Object
//!
//! Normalized email addresses.
//!
//! Transfers are addressed to an email, not an account id, and the recipient
//! check at accept time is exact equality. Normalizing (trim + ASCII
//! lowercase) at construction keeps that comparison exact without tripping
//! over case differences between a login email and the address a sender
//! typed.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when an email address fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    /// The address was empty after trimming.
    #[error("email address cannot be empty")]
    Empty,

    /// The address has no `@`, or an empty local/domain part.
    #[error("malformed email address: {0}")]
    Malformed(String),
}

/// A validated, normalized email address.
///
/// # Invariants
///
/// - Non-empty, contains exactly one `@` with non-empty local and domain
///   parts, no interior whitespace
/// - Stored trimmed and ASCII-lowercased, so equality is exact comparison
///
/// # Examples
///
/// ```
/// use boxoffice::domain::value_objects::email::EmailAddress;
///
/// let a = EmailAddress::new("Bob@Example.com").unwrap();
/// let b = EmailAddress::new("bob@example.com").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "bob@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address, normalizing case and whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if the address is empty or malformed.
    pub fn new(address: impl AsRef<str>) -> Result<Self, EmailError> {
        let normalized = address.as_ref().trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(EmailError::Empty);
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed(normalized));
        }
        match normalized.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(normalized))
            }
            _ => Err(EmailError::Malformed(normalized)),
        }
    }

    /// Returns the normalized address as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the value and returns the inner string.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailError;

    fn try_from(address: String) -> Result<Self, Self::Error> {
        Self::new(address)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_surrounding_whitespace() {
        let email = EmailAddress::new("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn equality_is_exact_after_normalization() {
        let a = EmailAddress::new("bob@example.com").unwrap();
        let b = EmailAddress::new("BOB@EXAMPLE.COM").unwrap();
        let c = EmailAddress::new("carol@example.com").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(matches!(EmailAddress::new(""), Err(EmailError::Empty)));
        assert!(matches!(EmailAddress::new("   "), Err(EmailError::Empty)));
        assert!(matches!(
            EmailAddress::new("no-at-sign"),
            Err(EmailError::Malformed(_))
        ));
        assert!(matches!(
            EmailAddress::new("@example.com"),
            Err(EmailError::Malformed(_))
        ));
        assert!(matches!(
            EmailAddress::new("bob@"),
            Err(EmailError::Malformed(_))
        ));
        assert!(matches!(
            EmailAddress::new("bob smith@example.com"),
            Err(EmailError::Malformed(_))
        ));
        assert!(matches!(
            EmailAddress::new("a@b@example.com"),
            Err(EmailError::Malformed(_))
        ));
    }

    #[test]
    fn serde_round_trips_and_validates() {
        let email = EmailAddress::new("dan@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"dan@example.com\"");

        let back: EmailAddress = serde_json::from_str("\"DAN@example.com\"").unwrap();
        assert_eq!(back, email);

        let bad: Result<EmailAddress, _> = serde_json::from_str("\"not-an-email\"");
        assert!(bad.is_err());
    }
}
