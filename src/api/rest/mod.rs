//! # REST API
//!
//! Axum handlers and routes for the marketplace HTTP surface.

pub mod handlers;
pub mod routes;
