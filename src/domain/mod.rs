//! # Domain Layer
//!
//! Core business logic following Domain-Driven Design principles.
//!
//! This layer contains:
//! - **Entities**: Aggregate roots and reference data (Ticket, Listing, Transfer, Event, User)
//! - **Value Objects**: Immutable types with validation (Money, identifiers, statuses)
//! - **Events**: Domain events describing committed marketplace changes
//! - **Errors**: Domain-specific error types
//! - **Services**: Stateless policy logic (resale pricing)

pub mod entities;
pub mod errors;
pub mod events;
pub mod services;
pub mod value_objects;
