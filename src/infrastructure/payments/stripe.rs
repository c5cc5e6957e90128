//! # Stripe Payment Gateway
//!
//! Adapter for the Stripe Payment Intents API.
//!
//! This module provides the [`StripeGateway`] which implements the
//! [`PaymentGateway`] trait against Stripe's REST API.
//!
//! # Features
//!
//! - Payment intent creation with marketplace metadata
//! - Intent retrieval for settlement checks
//! - Card decline and missing-resource error mapping
//! - Configurable base URL for test servers
//!
//! # Examples
//!
//! ```ignore
//! use boxoffice::infrastructure::payments::stripe::{StripeConfig, StripeGateway};
//!
//! let config = StripeConfig::new("sk_live_...");
//! let gateway = StripeGateway::new(config)?;
//! ```

use crate::domain::value_objects::{Money, PaymentIntentId};
use crate::infrastructure::payments::{
    CreateIntentRequest, PaymentError, PaymentGateway, PaymentIntent, PaymentIntentStatus,
    PaymentMetadata, PaymentResult,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Default timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Base URL for the Stripe API.
const BASE_URL: &str = "https://api.stripe.com";

/// Payment intent object as returned by the Stripe API.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeIntentResponse {
    /// Intent identifier, `pi_`-prefixed.
    pub id: String,
    /// Intent status in Stripe's vocabulary.
    pub status: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// Secret the front end uses to confirm the payment.
    pub client_secret: Option<String>,
    /// Metadata attached at creation.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Error response from the Stripe API.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    /// Error detail.
    pub error: StripeErrorDetail,
}

/// Error detail within a Stripe error response.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetail {
    /// Error category, e.g. `card_error` or `invalid_request_error`.
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    /// Machine-readable error code, e.g. `resource_missing`.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: Option<String>,
}

/// Configuration for the Stripe gateway.
///
/// # Examples
///
/// ```
/// use boxoffice::infrastructure::payments::stripe::StripeConfig;
///
/// let config = StripeConfig::new("sk_test_key")
///     .with_timeout_ms(3000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    /// Secret API key.
    secret_key: String,
    /// Base URL for the Stripe API.
    base_url: String,
    /// Timeout in milliseconds.
    timeout_ms: u64,
}

impl StripeConfig {
    /// Creates a new Stripe configuration.
    #[must_use]
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Sets the base URL, used to point at a test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Returns the secret API key.
    #[inline]
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Returns the base URL.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Builds the intent collection URL.
    #[must_use]
    pub fn intents_url(&self) -> String {
        format!("{}/v1/payment_intents", self.base_url)
    }

    /// Builds the URL for a single intent.
    #[must_use]
    pub fn intent_url(&self, id: &PaymentIntentId) -> String {
        format!("{}/v1/payment_intents/{}", self.base_url, id)
    }
}

/// Stripe payment gateway.
///
/// Implements the [`PaymentGateway`] trait over Stripe's Payment Intents
/// API using form-encoded requests.
pub struct StripeGateway {
    /// Configuration.
    config: StripeConfig,
    /// Shared HTTP client.
    client: reqwest::Client,
}

impl StripeGateway {
    /// Creates a new Stripe gateway.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Request`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms()))
            .build()
            .map_err(PaymentError::request)?;

        Ok(Self { config, client })
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Builds the form body for intent creation.
    ///
    /// Metadata keys use Stripe's `metadata[key]` convention.
    fn intent_form(request: &CreateIntentRequest) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), request.amount.minor_units().to_string()),
            ("currency".to_string(), request.currency.clone()),
            (
                "receipt_email".to_string(),
                request.receipt_email.as_str().to_string(),
            ),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];

        for (key, value) in request.metadata.pairs() {
            form.push((format!("metadata[{key}]"), value));
        }

        form
    }

    /// Maps a Stripe status string onto [`PaymentIntentStatus`].
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Protocol`] for statuses this client does
    /// not recognise.
    fn parse_status(raw: &str) -> PaymentResult<PaymentIntentStatus> {
        match raw {
            "requires_payment_method" => Ok(PaymentIntentStatus::RequiresPaymentMethod),
            "requires_confirmation" | "requires_action" => Ok(PaymentIntentStatus::RequiresAction),
            "processing" | "requires_capture" => Ok(PaymentIntentStatus::Processing),
            "succeeded" => Ok(PaymentIntentStatus::Succeeded),
            "canceled" => Ok(PaymentIntentStatus::Cancelled),
            other => Err(PaymentError::protocol(format!(
                "unrecognised intent status: {other}"
            ))),
        }
    }

    /// Converts a wire intent into the domain representation.
    fn parse_intent(body: StripeIntentResponse) -> PaymentResult<PaymentIntent> {
        let status = Self::parse_status(&body.status)?;
        let metadata = PaymentMetadata::from_pairs(&body.metadata)?;
        let amount = Money::from_minor(body.amount)
            .map_err(|_| PaymentError::protocol(format!("invalid intent amount: {}", body.amount)))?;

        Ok(PaymentIntent {
            id: PaymentIntentId::new(body.id),
            client_secret: body.client_secret,
            status,
            amount,
            metadata,
        })
    }

    /// Maps a non-success Stripe response onto a [`PaymentError`].
    async fn api_error(response: reqwest::Response) -> PaymentError {
        let status = response.status();

        match response.json::<StripeErrorResponse>().await {
            Ok(body) => {
                let detail = body.error;
                let message = detail
                    .message
                    .unwrap_or_else(|| format!("HTTP {status} with no message"));

                if detail.error_type.as_deref() == Some("card_error") {
                    PaymentError::declined(message)
                } else if detail.code.as_deref() == Some("resource_missing") {
                    PaymentError::intent_not_found(message)
                } else {
                    PaymentError::request(format!("stripe returned {status}: {message}"))
                }
            }
            Err(_) => PaymentError::request(format!("stripe returned {status}")),
        }
    }
}

impl fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeGateway")
            .field("base_url", &self.config.base_url())
            .field("timeout_ms", &self.config.timeout_ms())
            .finish()
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, request: CreateIntentRequest) -> PaymentResult<PaymentIntent> {
        let response = self
            .client
            .post(self.config.intents_url())
            .bearer_auth(self.config.secret_key())
            .form(&Self::intent_form(&request))
            .send()
            .await
            .map_err(PaymentError::request)?;

        if response.status().is_success() {
            let body: StripeIntentResponse = response
                .json()
                .await
                .map_err(|e| PaymentError::protocol(format!("intent body not JSON: {e}")))?;
            Self::parse_intent(body)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn retrieve_intent(&self, id: &PaymentIntentId) -> PaymentResult<PaymentIntent> {
        let response = self
            .client
            .get(self.config.intent_url(id))
            .bearer_auth(self.config.secret_key())
            .send()
            .await
            .map_err(PaymentError::request)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(PaymentError::intent_not_found(id));
        }

        if response.status().is_success() {
            let body: StripeIntentResponse = response
                .json()
                .await
                .map_err(|e| PaymentError::protocol(format!("intent body not JSON: {e}")))?;
            Self::parse_intent(body)
        } else {
            Err(Self::api_error(response).await)
        }
    }
}
