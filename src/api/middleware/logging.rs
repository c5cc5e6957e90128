//! # Logging Middleware
//!
//! Request/response logging with structured fields.
//!
//! Every request gets a request ID (taken from the incoming header or
//! generated), which is recorded on the tracing span, stored in request
//! extensions, and echoed back on the response. Completion is logged at a
//! level chosen from the response status class.
//!
//! # Usage
//!
//! ```ignore
//! use boxoffice::api::middleware::logging::{LoggingConfig, logging_middleware};
//!
//! let config = Arc::new(LoggingConfig::default());
//! let app = Router::new()
//!     .route("/api", get(handler))
//!     .layer(middleware::from_fn_with_state(config, logging_middleware));
//! ```

use crate::api::middleware::auth::Claims;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Span, debug, error, info, instrument, warn};
use uuid::Uuid;

// ============================================================================
// Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Whether to log request headers.
    pub log_headers: bool,
    /// Headers to redact from logs.
    pub redacted_headers: Vec<String>,
    /// Header name for request ID propagation.
    pub request_id_header: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_headers: false,
            redacted_headers: vec![
                "authorization".to_string(),
                "cookie".to_string(),
                "x-api-key".to_string(),
            ],
            request_id_header: "X-Request-ID".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables header logging.
    #[must_use]
    pub fn with_headers(mut self) -> Self {
        self.log_headers = true;
        self
    }

    /// Adds headers to redact.
    #[must_use]
    pub fn with_redacted_headers(mut self, headers: Vec<String>) -> Self {
        self.redacted_headers.extend(headers);
        self
    }

    /// Sets a custom request ID header name.
    #[must_use]
    pub fn with_request_id_header(mut self, header: impl Into<String>) -> Self {
        self.request_id_header = header.into();
        self
    }
}

// ============================================================================
// Request ID
// ============================================================================

/// A unique request identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generates a new random request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a request ID from an existing string.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the request ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Sensitive Data Redaction
// ============================================================================

/// Redacts sensitive values from headers.
#[must_use]
pub fn redact_headers(headers: &HeaderMap, redacted_names: &[String]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_str = name.as_str().to_lowercase();
            let value_str = if redacted_names.iter().any(|r| r.to_lowercase() == name_str) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.as_str().to_string(), value_str)
        })
        .collect()
}

// ============================================================================
// Middleware
// ============================================================================

/// Logging middleware function.
///
/// Logs request and response information with structured fields.
#[instrument(skip_all, fields(request_id))]
pub async fn logging_middleware(
    State(config): State<Arc<LoggingConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let request_id = request
        .headers()
        .get(&config.request_id_header)
        .and_then(|v| v.to_str().ok())
        .map(RequestId::from_string)
        .unwrap_or_else(RequestId::new);

    Span::current().record("request_id", request_id.as_str());
    request.extensions_mut().insert(request_id.clone());

    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(ToString::to_string);

    if config.log_headers {
        let headers = redact_headers(request.headers(), &config.redacted_headers);
        debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            headers = ?headers,
            "request headers"
        );
    }

    debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = ?query,
        "request started"
    );

    let mut response = next.run(request).await;

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    // The authenticated caller, when the auth middleware ran first
    let user_id = response
        .extensions()
        .get::<Claims>()
        .map(|c| c.sub.clone());

    if let Ok(header_value) = HeaderValue::from_str(request_id.as_str())
        && let Ok(header_name) =
            axum::http::header::HeaderName::from_bytes(config.request_id_header.as_bytes())
    {
        response.headers_mut().insert(header_name, header_value);
    }

    let status = response.status();
    if status.is_client_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            user_id = ?user_id,
            "client error"
        );
    } else if status.is_server_error() {
        error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            user_id = ?user_id,
            "server error"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            user_id = ?user_id,
            "request completed"
        );
    }

    response
}
