//! # Domain Errors
//!
//! Typed error types for domain operations.
//!
//! Error codes are organized by category:
//! - 1000-1999: Validation errors
//! - 2000-2999: State errors
//!
//! # Examples
//!
//! ```
//! use boxoffice::domain::errors::{DomainError, DomainResult};
//!
//! fn validate_minor_units(amount: i64) -> DomainResult<i64> {
//!     if amount <= 0 {
//!         return Err(DomainError::InvalidPrice("price must be positive".to_string()));
//!     }
//!     Ok(amount)
//! }
//! ```

pub mod domain_error;

pub use domain_error::{DomainError, DomainResult};
