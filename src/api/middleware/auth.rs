//! # Authentication Middleware
//!
//! JWT bearer authentication for protected API endpoints.
//!
//! Tokens are HS256-signed and carry the platform account identity the
//! marketplace acts for:
//!
//! - `sub` - the user ID (UUID)
//! - `email` - the account's verified email address
//! - `exp` / `iat` - expiry and issue time (Unix seconds)
//! - `iss` / `aud` - optional issuer and audience, checked when configured
//!
//! The middleware validates the token and stores the [`Claims`] in request
//! extensions; handlers receive the caller as a [`CurrentUser`] extractor.
//!
//! # Usage
//!
//! ```ignore
//! use boxoffice::api::middleware::auth::{AuthConfig, require_auth};
//!
//! let config = Arc::new(AuthConfig::new("secret-key"));
//! let app = Router::new()
//!     .route("/protected", post(handler))
//!     .route_layer(middleware::from_fn_with_state(config, require_auth));
//! ```

use crate::domain::value_objects::{EmailAddress, UserId};
use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Configuration
// ============================================================================

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for HMAC-based JWT validation.
    pub secret: String,
    /// Expected issuer claim.
    pub issuer: Option<String>,
    /// Expected audience claim.
    pub audience: Option<String>,
}

impl AuthConfig {
    /// Creates a new auth config with the given secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: None,
            audience: None,
        }
    }

    /// Sets the expected issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the expected audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

// ============================================================================
// JWT Claims
// ============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: String,
    /// The account's email address.
    pub email: String,
    /// Expiration time (Unix timestamp).
    pub exp: u64,
    /// Issued at time (Unix timestamp).
    pub iat: u64,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(sub: impl Into<String>, email: impl Into<String>, exp: u64, iat: u64) -> Self {
        Self {
            sub: sub.into(),
            email: email.into(),
            exp,
            iat,
            iss: None,
            aud: None,
        }
    }

    /// Sets the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Sets the audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.aud = Some(audience.into());
        self
    }

    /// Checks if the token is expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.exp < now
    }
}

// ============================================================================
// Authentication Error
// ============================================================================

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing authentication credentials.
    #[error("missing authentication credentials")]
    MissingCredentials,

    /// Token validation failed.
    #[error("token validation failed: {0}")]
    ValidationFailed(String),

    /// Token expired.
    #[error("token expired")]
    TokenExpired,

    /// The token verified but its claims do not describe a platform user.
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let code = match &self {
            AuthError::MissingCredentials => "MISSING_CREDENTIALS",
            AuthError::ValidationFailed(_) => "VALIDATION_FAILED",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidClaims(_) => "INVALID_CLAIMS",
        };

        let body = serde_json::json!({
            "code": code,
            "message": self.to_string(),
        });

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

// ============================================================================
// JWT Utilities
// ============================================================================

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
}

/// Validates a JWT token and returns the claims.
///
/// # Errors
///
/// Returns an error if the token is invalid, expired, or fails the
/// configured issuer/audience checks.
pub fn validate_jwt(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();

    if let Some(ref issuer) = config.issuer {
        validation.set_issuer(&[issuer]);
    }

    if let Some(ref audience) = config.audience {
        validation.set_audience(&[audience]);
    }

    let key = DecodingKey::from_secret(config.secret.as_bytes());

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::ValidationFailed(e.to_string()),
        })
}

/// Creates a JWT token from claims.
///
/// # Errors
///
/// Returns an error if token encoding fails.
pub fn create_jwt(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), claims, &key).map_err(|e| AuthError::ValidationFailed(e.to_string()))
}

// ============================================================================
// Middleware
// ============================================================================

/// Bearer authentication middleware.
///
/// Validates the `Authorization: Bearer <token>` header and stores the
/// claims in request extensions for [`CurrentUser`] to read. The claims
/// are echoed into response extensions so outer middleware can attribute
/// the request when logging.
///
/// # Errors
///
/// Returns a 401 JSON response when the header is missing or the token
/// does not validate.
pub async fn require_auth(
    State(config): State<Arc<AuthConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or(AuthError::MissingCredentials)?;

    debug!("validating bearer token");
    let claims = validate_jwt(token, &config)?;
    request.extensions_mut().insert(claims.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(claims);
    Ok(response)
}

// ============================================================================
// Request Extension Extractor
// ============================================================================

/// The authenticated caller, resolved from validated claims.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The caller's user ID.
    pub id: UserId,
    /// The caller's verified email address.
    pub email: EmailAddress,
}

impl TryFrom<&Claims> for CurrentUser {
    type Error = AuthError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map(UserId::new)
            .map_err(|_| AuthError::InvalidClaims("subject is not a user id".to_string()))?;
        let email = EmailAddress::new(&claims.email)
            .map_err(|e| AuthError::InvalidClaims(e.to_string()))?;

        Ok(Self { id, email })
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .ok_or(AuthError::MissingCredentials)?;

        Self::try_from(claims)
    }
}
