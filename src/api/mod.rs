//! # API Layer
//!
//! External interfaces for the resale marketplace.
//!
//! ## Protocols
//!
//! - **REST**: marketplace and transfer operations under `/api/v1`
//!
//! ## Middleware
//!
//! - Authentication (JWT bearer tokens)
//! - Request logging with request IDs

pub mod middleware;
pub mod rest;
