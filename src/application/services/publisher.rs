//! # Event Publisher
//!
//! Outbound channel for domain events.
//!
//! Services publish a [`MarketplaceEvent`] after each successful commit.
//! Publishing is best effort: a failed publish is logged and never rolls
//! back the state change that produced it.

use crate::domain::events::MarketplaceEvent;
use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Error raised when an event cannot be handed to the outbound channel.
#[derive(Debug, Error)]
#[error("event publish failed: {0}")]
pub struct PublishError(String);

impl PublishError {
    /// Creates a new publish error.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Result type for publish operations.
pub type PublishResult = Result<(), PublishError>;

/// Outbound channel for domain events.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` for use in async contexts.
#[async_trait]
pub trait EventPublisher: Send + Sync + fmt::Debug {
    /// Publishes a single event.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] if the event cannot be handed off.
    async fn publish(&self, event: &MarketplaceEvent) -> PublishResult;
}

/// Publisher that emits events to the structured log.
///
/// The default outbound channel: downstream consumers tail the log until
/// a broker integration replaces this.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPublisher;

#[async_trait]
impl EventPublisher for LoggingPublisher {
    async fn publish(&self, event: &MarketplaceEvent) -> PublishResult {
        let payload = serde_json::to_string(event).map_err(|e| PublishError::new(e.to_string()))?;

        tracing::info!(
            event = event.name(),
            ticket_id = %event.ticket_id(),
            payload,
            "domain event"
        );

        Ok(())
    }
}

/// Publisher that records events in memory.
///
/// Used by integration tests to assert on the event stream a flow
/// produced.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    /// Published events in order.
    events: Arc<Mutex<Vec<MarketplaceEvent>>>,
}

impl RecordingPublisher {
    /// Creates an empty recording publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events published so far.
    #[must_use]
    pub fn events(&self) -> Vec<MarketplaceEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns the names of the events published so far.
    #[must_use]
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(MarketplaceEvent::name)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &MarketplaceEvent) -> PublishResult {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
        Ok(())
    }
}
