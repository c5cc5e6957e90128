//! # Persistence Layer
//!
//! Storage ports and their implementations.
//!
//! [`traits`] defines the [`MarketplaceStore`] and [`UserDirectory`]
//! ports; [`in_memory`] backs them with process-local tables for tests
//! and development, [`postgres`] with sqlx for production.
//!
//! [`MarketplaceStore`]: traits::MarketplaceStore
//! [`UserDirectory`]: traits::UserDirectory

pub mod in_memory;
pub mod postgres;
pub mod traits;

pub use in_memory::{InMemoryMarketplaceStore, InMemoryUserDirectory};
pub use postgres::{PostgresMarketplaceStore, PostgresUserDirectory};
pub use traits::{ListingQuery, MarketplaceStore, StoreError, StoreResult, UserDirectory};
