//! # Domain Services
//!
//! Stateless policy logic that spans entities without belonging to any one
//! of them.
//!
//! - [`resale_pricing`]: the cap policy bounding resale prices

pub mod resale_pricing;
#[cfg(test)]
mod tests;

pub use resale_pricing::{DEFAULT_PERCENTAGE_CAP, ResaleCeiling, max_resale_price};
