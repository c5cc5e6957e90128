//! # In-Memory Persistence
//!
//! In-memory implementations of the persistence ports, for unit tests and
//! local development without a database.

pub mod store;
pub mod users;

pub use store::InMemoryMarketplaceStore;
pub use users::InMemoryUserDirectory;
