//! # Infrastructure Layer
//!
//! External adapters and implementations of domain ports.
//!
//! ## Payments
//!
//! Payment gateway adapters:
//! - Stripe over HTTPS
//! - A deterministic simulator for tests and development
//!
//! ## Persistence
//!
//! Storage implementations:
//! - PostgreSQL store and user directory
//! - In-memory equivalents for tests and development

pub mod payments;
pub mod persistence;
