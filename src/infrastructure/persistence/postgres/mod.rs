//! # PostgreSQL Persistence
//!
//! PostgreSQL implementations of the persistence ports using sqlx.

pub mod store;
pub mod users;

#[cfg(test)]
mod tests;

pub use store::PostgresMarketplaceStore;
pub use users::PostgresUserDirectory;
