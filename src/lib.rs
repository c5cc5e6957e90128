//! # Boxoffice
//!
//! Resale marketplace and ticket transfer core for a ticketing platform.
//! Fans list tickets for resale at capped prices, buy them through a
//! payment gateway, and gift them to friends over email claim links.
//!
//! ## Architecture
//!
//! This crate follows Domain-Driven Design with a layered architecture:
//!
//! - **Domain Layer** (`domain`): Core business logic, entities, value objects, and domain events
//! - **Application Layer** (`application`): Services, DTOs, and orchestration
//! - **Infrastructure Layer** (`infrastructure`): Payment gateways and storage backends
//! - **API Layer** (`api`): REST interface and HTTP middleware
//!
//! ## Example
//!
//! ```rust,ignore
//! use boxoffice::application::{CreateListingRequest, services::ResaleMarketService};
//! use boxoffice::domain::value_objects::Money;
//!
//! // List a ticket at its face value
//! let created = market
//!     .create_listing(seller_id, CreateListingRequest {
//!         ticket_id,
//!         price: Money::from_minor(5_000)?,
//!     })
//!     .await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
