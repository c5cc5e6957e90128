//! # Simulated Payment Gateway
//!
//! An in-process payment gateway for testing and local development.
//!
//! This module provides the [`SimulatedGateway`] which implements the
//! [`PaymentGateway`] trait without leaving the process.
//!
//! # Features
//!
//! - Deterministic, sequential intent identifiers
//! - Configurable status for newly created intents
//! - Decline injection for failure-path testing
//! - Manual status switches so tests can walk an intent to `Succeeded`
//!
//! # Examples
//!
//! ```ignore
//! use boxoffice::infrastructure::payments::simulator::{SimulatedGateway, SimulatorConfig};
//!
//! let gateway = SimulatedGateway::new(SimulatorConfig::default());
//!
//! let intent = gateway.create_intent(request).await?;
//! gateway.mark_succeeded(&intent.id).await?;
//! ```

use crate::domain::value_objects::PaymentIntentId;
use crate::infrastructure::payments::{
    CreateIntentRequest, PaymentError, PaymentGateway, PaymentIntent, PaymentIntentStatus,
    PaymentResult,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Configuration for the simulated gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Status assigned to newly created intents.
    initial_status: PaymentIntentStatus,
    /// Whether to refuse intent creation.
    decline_creates: bool,
    /// Reason reported when creation is refused.
    decline_reason: Option<String>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            initial_status: PaymentIntentStatus::RequiresPaymentMethod,
            decline_creates: false,
            decline_reason: None,
        }
    }
}

impl SimulatorConfig {
    /// Creates a configuration with default behaviour.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status assigned to newly created intents.
    #[must_use]
    pub fn with_initial_status(mut self, status: PaymentIntentStatus) -> Self {
        self.initial_status = status;
        self
    }

    /// Makes intent creation fail as declined.
    #[must_use]
    pub fn with_create_decline(mut self, reason: impl Into<String>) -> Self {
        self.decline_creates = true;
        self.decline_reason = Some(reason.into());
        self
    }

    /// Returns the status assigned to newly created intents.
    #[inline]
    #[must_use]
    pub fn initial_status(&self) -> PaymentIntentStatus {
        self.initial_status
    }

    /// Returns whether intent creation is refused.
    #[inline]
    #[must_use]
    pub fn declines_creates(&self) -> bool {
        self.decline_creates
    }
}

/// Simulated payment gateway.
///
/// Intents live in memory. Tests walk an intent through its lifecycle
/// with [`SimulatedGateway::mark_succeeded`] and
/// [`SimulatedGateway::mark_failed`], then settle through the normal
/// service path.
#[derive(Debug)]
pub struct SimulatedGateway {
    /// Configuration.
    config: SimulatorConfig,
    /// Stored intents keyed by identifier.
    intents: Arc<RwLock<HashMap<String, PaymentIntent>>>,
    /// Sequence for intent identifiers.
    sequence: AtomicU64,
}

impl SimulatedGateway {
    /// Creates a new simulated gateway.
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            intents: Arc::new(RwLock::new(HashMap::new())),
            sequence: AtomicU64::new(0),
        }
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Returns the number of stored intents.
    ///
    /// Returns 0 if the lock cannot be acquired immediately.
    #[must_use]
    pub fn intent_count(&self) -> usize {
        self.intents.try_read().map(|m| m.len()).unwrap_or(0)
    }

    /// Sets an intent's status.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::IntentNotFound`] for unknown identifiers.
    pub async fn set_status(
        &self,
        id: &PaymentIntentId,
        status: PaymentIntentStatus,
    ) -> PaymentResult<()> {
        let mut intents = self.intents.write().await;
        let intent = intents
            .get_mut(id.as_str())
            .ok_or_else(|| PaymentError::intent_not_found(id))?;
        intent.status = status;
        Ok(())
    }

    /// Marks an intent as succeeded, as if the buyer completed payment.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::IntentNotFound`] for unknown identifiers.
    pub async fn mark_succeeded(&self, id: &PaymentIntentId) -> PaymentResult<()> {
        self.set_status(id, PaymentIntentStatus::Succeeded).await
    }

    /// Marks an intent as failed.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::IntentNotFound`] for unknown identifiers.
    pub async fn mark_failed(&self, id: &PaymentIntentId) -> PaymentResult<()> {
        self.set_status(id, PaymentIntentStatus::Failed).await
    }

    /// Builds the next sequential intent identifier.
    fn next_intent_id(&self) -> String {
        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        format!("pi_sim_{n:06}")
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn create_intent(&self, request: CreateIntentRequest) -> PaymentResult<PaymentIntent> {
        if self.config.decline_creates {
            let reason = self
                .config
                .decline_reason
                .clone()
                .unwrap_or_else(|| "simulated decline".to_string());
            return Err(PaymentError::declined(reason));
        }

        let id = self.next_intent_id();
        let intent = PaymentIntent {
            id: PaymentIntentId::new(&id),
            client_secret: Some(format!("{id}_secret_sim")),
            status: self.config.initial_status,
            amount: request.amount,
            metadata: request.metadata,
        };

        let mut intents = self.intents.write().await;
        intents.insert(id, intent.clone());

        Ok(intent)
    }

    async fn retrieve_intent(&self, id: &PaymentIntentId) -> PaymentResult<PaymentIntent> {
        let intents = self.intents.read().await;
        intents
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| PaymentError::intent_not_found(id))
    }
}
