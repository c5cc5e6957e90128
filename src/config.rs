//! # Configuration
//!
//! Application configuration loading and management.
//!
//! This module provides configuration structures and loading mechanisms
//! for the marketplace service, supporting both environment variables and
//! configuration files.
//!
//! # Configuration Sources
//!
//! Configuration is loaded in the following order (later sources override earlier):
//! 1. Default values
//! 2. Configuration file (if exists)
//! 3. Environment variables (prefixed with `BOXOFFICE_`)
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `BOXOFFICE_CONFIG_FILE` | Path to the TOML config file | `config.toml` |
//! | `BOXOFFICE_REST_HOST` | REST server host | `0.0.0.0` |
//! | `BOXOFFICE_REST_PORT` | REST server port | `8080` |
//! | `BOXOFFICE_LOG_LEVEL` | Log level | `info` |
//! | `BOXOFFICE_LOG_FORMAT` | Log format (json/pretty) | `json` |
//! | `BOXOFFICE_DATABASE_BACKEND` | Storage backend (memory/postgres) | `memory` |
//! | `BOXOFFICE_DATABASE_URL` | Postgres connection URL | `postgres://localhost/boxoffice` |
//! | `BOXOFFICE_JWT_SECRET` | HMAC secret bearer tokens are signed with | dev-only value |
//! | `BOXOFFICE_PAYMENT_PROVIDER` | Payment provider (simulated/stripe) | `simulated` |
//! | `BOXOFFICE_STRIPE_SECRET_KEY` | Stripe secret API key | empty |
//! | `BOXOFFICE_RESALE_FEE_PERCENT` | Platform fee in whole percent | `8` |
//! | `BOXOFFICE_RESALE_CURRENCY` | ISO 4217 settlement currency | `gbp` |
//! | `BOXOFFICE_TRANSFER_EXPIRY_DAYS` | Days before a transfer invitation lapses | `7` |
//! | `BOXOFFICE_CLAIM_LINK_BASE_URL` | Base URL for transfer claim links | `http://localhost:8080` |
//!
//! # Examples
//!
//! ```ignore
//! use boxoffice::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("REST server: {}:{}", config.rest.host, config.rest.port);
//! ```

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse configuration.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Invalid configuration value.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },
}

// ============================================================================
// Server Configuration
// ============================================================================

/// REST/HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Server host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port.
    #[serde(default = "default_rest_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Enable CORS.
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (empty = allow all).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_rest_port(),
            request_timeout_secs: default_request_timeout(),
            enable_cors: true,
            cors_origins: Vec::new(),
        }
    }
}

impl RestConfig {
    /// Returns the socket address for the REST server.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                field: "rest.host:port".to_string(),
                message: format!("{e}"),
            })
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (structured logging).
    #[default]
    Json,
    /// Pretty format (human-readable).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include target (module path) in logs.
    #[serde(default = "default_true")]
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Json,
            include_target: true,
        }
    }
}

// ============================================================================
// Database Configuration
// ============================================================================

/// Storage backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local tables, lost on restart.
    #[default]
    Memory,
    /// PostgreSQL via sqlx.
    Postgres,
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Storage backend.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database URL (postgres backend only).
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum connection pool size.
    #[serde(default = "default_pool_size")]
    pub max_connections: u32,

    /// Minimum connection pool size.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            url: default_database_url(),
            max_connections: default_pool_size(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connection_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

// ============================================================================
// Auth Configuration
// ============================================================================

/// Bearer token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret tokens are signed and validated with.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Expected token issuer (unset disables the check).
    #[serde(default)]
    pub issuer: Option<String>,

    /// Expected token audience (unset disables the check).
    #[serde(default)]
    pub audience: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            issuer: None,
            audience: None,
        }
    }
}

// ============================================================================
// Payments Configuration
// ============================================================================

/// Payment provider options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    /// Deterministic in-process gateway, no external calls.
    #[default]
    Simulated,
    /// Stripe over HTTPS.
    Stripe,
}

/// Payment gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaymentsConfig {
    /// Payment provider.
    #[serde(default)]
    pub provider: PaymentProvider,

    /// Stripe secret API key (stripe provider only).
    #[serde(default)]
    pub stripe_secret_key: String,

    /// Stripe API base URL override, used to point at a test server.
    #[serde(default)]
    pub stripe_base_url: Option<String>,
}

// ============================================================================
// Marketplace Configuration
// ============================================================================

/// Resale marketplace configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResaleConfig {
    /// Platform fee charged on top of the asking price, in whole percent.
    #[serde(default = "default_fee_percent")]
    pub fee_percent: u32,

    /// ISO 4217 currency code sent to the payment gateway, lowercase.
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for ResaleConfig {
    fn default() -> Self {
        Self {
            fee_percent: default_fee_percent(),
            currency: default_currency(),
        }
    }
}

/// Ticket transfer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransfersConfig {
    /// Days before a pending invitation lapses.
    #[serde(default = "default_expiry_days")]
    pub expiry_days: i64,

    /// Base URL the shareable claim link is built from.
    #[serde(default = "default_claim_link_base_url")]
    pub claim_link_base_url: String,
}

impl Default for TransfersConfig {
    fn default() -> Self {
        Self {
            expiry_days: default_expiry_days(),
            claim_link_base_url: default_claim_link_base_url(),
        }
    }
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST server configuration.
    #[serde(default)]
    pub rest: RestConfig,

    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Bearer token configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Payment gateway configuration.
    #[serde(default)]
    pub payments: PaymentsConfig,

    /// Resale marketplace configuration.
    #[serde(default)]
    pub resale: ResaleConfig,

    /// Ticket transfer configuration.
    #[serde(default)]
    pub transfers: TransfersConfig,

    /// Service name for tracing.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Environment (development, staging, production).
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rest: RestConfig::default(),
            log: LogConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            payments: PaymentsConfig::default(),
            resale: ResaleConfig::default(),
            transfers: TransfersConfig::default(),
            service_name: default_service_name(),
            environment: default_environment(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables and optional config file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Try to load from config file if it exists
        let config_path =
            std::env::var("BOXOFFICE_CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if Path::new(&config_path).exists() {
            config = Self::from_file(&config_path)?;
        }

        // Override with environment variables
        config.apply_env_overrides();

        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        // REST configuration
        if let Ok(host) = std::env::var("BOXOFFICE_REST_HOST") {
            self.rest.host = host;
        }
        if let Ok(port) = std::env::var("BOXOFFICE_REST_PORT")
            && let Ok(p) = port.parse()
        {
            self.rest.port = p;
        }

        // Logging configuration
        if let Ok(level) = std::env::var("BOXOFFICE_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Ok(format) = std::env::var("BOXOFFICE_LOG_FORMAT") {
            self.log.format = match format.to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                _ => LogFormat::Json,
            };
        }

        // Database configuration
        if let Ok(backend) = std::env::var("BOXOFFICE_DATABASE_BACKEND") {
            self.database.backend = match backend.to_lowercase().as_str() {
                "postgres" => StorageBackend::Postgres,
                _ => StorageBackend::Memory,
            };
        }
        if let Ok(url) = std::env::var("BOXOFFICE_DATABASE_URL") {
            self.database.url = url;
        }

        // Auth configuration
        if let Ok(secret) = std::env::var("BOXOFFICE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(issuer) = std::env::var("BOXOFFICE_JWT_ISSUER") {
            self.auth.issuer = Some(issuer);
        }
        if let Ok(audience) = std::env::var("BOXOFFICE_JWT_AUDIENCE") {
            self.auth.audience = Some(audience);
        }

        // Payments configuration
        if let Ok(provider) = std::env::var("BOXOFFICE_PAYMENT_PROVIDER") {
            self.payments.provider = match provider.to_lowercase().as_str() {
                "stripe" => PaymentProvider::Stripe,
                _ => PaymentProvider::Simulated,
            };
        }
        if let Ok(key) = std::env::var("BOXOFFICE_STRIPE_SECRET_KEY") {
            self.payments.stripe_secret_key = key;
        }

        // Marketplace configuration
        if let Ok(fee) = std::env::var("BOXOFFICE_RESALE_FEE_PERCENT")
            && let Ok(f) = fee.parse()
        {
            self.resale.fee_percent = f;
        }
        if let Ok(currency) = std::env::var("BOXOFFICE_RESALE_CURRENCY") {
            self.resale.currency = currency;
        }
        if let Ok(days) = std::env::var("BOXOFFICE_TRANSFER_EXPIRY_DAYS")
            && let Ok(d) = days.parse()
        {
            self.transfers.expiry_days = d;
        }
        if let Ok(base) = std::env::var("BOXOFFICE_CLAIM_LINK_BASE_URL") {
            self.transfers.claim_link_base_url = base;
        }

        // Service configuration
        if let Ok(name) = std::env::var("BOXOFFICE_SERVICE_NAME") {
            self.service_name = name;
        }
        if let Ok(env) = std::env::var("BOXOFFICE_ENVIRONMENT") {
            self.environment = env;
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate REST address
        self.rest.socket_addr()?;

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "log.level".to_string(),
                message: format!(
                    "invalid log level '{}', must be one of: {:?}",
                    self.log.level, valid_levels
                ),
            });
        }

        // Validate auth
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.jwt_secret".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        // Validate payments
        if self.payments.provider == PaymentProvider::Stripe
            && self.payments.stripe_secret_key.is_empty()
        {
            return Err(ConfigError::InvalidValue {
                field: "payments.stripe_secret_key".to_string(),
                message: "required when payments.provider is 'stripe'".to_string(),
            });
        }

        // Validate marketplace settings
        if self.resale.fee_percent > 100 {
            return Err(ConfigError::InvalidValue {
                field: "resale.fee_percent".to_string(),
                message: format!("{} exceeds 100", self.resale.fee_percent),
            });
        }
        if self.resale.currency.len() != 3 {
            return Err(ConfigError::InvalidValue {
                field: "resale.currency".to_string(),
                message: format!("'{}' is not a 3-letter ISO 4217 code", self.resale.currency),
            });
        }
        if self.transfers.expiry_days < 1 {
            return Err(ConfigError::InvalidValue {
                field: "transfers.expiry_days".to_string(),
                message: format!("{} must be at least 1", self.transfers.expiry_days),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Default Value Functions
// ============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_rest_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_url() -> String {
    "postgres://localhost/boxoffice".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_jwt_secret() -> String {
    "boxoffice-dev-secret".to_string()
}

fn default_fee_percent() -> u32 {
    8
}

fn default_currency() -> String {
    "gbp".to_string()
}

fn default_expiry_days() -> i64 {
    7
}

fn default_claim_link_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_service_name() -> String {
    "boxoffice".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.rest.port, 8080);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.payments.provider, PaymentProvider::Simulated);
        assert_eq!(config.resale.fee_percent, 8);
        assert_eq!(config.transfers.expiry_days, 7);
    }

    #[test]
    fn rest_config_socket_addr() {
        let config = RestConfig::default();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn rest_config_invalid_address() {
        let config = RestConfig {
            host: "invalid host with spaces".to_string(),
            ..Default::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn log_format_default() {
        let format = LogFormat::default();
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn app_config_validate_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn app_config_validate_invalid_log_level() {
        let mut config = AppConfig::default();
        config.log.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_jwt_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_stripe_key_for_stripe_provider() {
        let mut config = AppConfig::default();
        config.payments.provider = PaymentProvider::Stripe;
        assert!(config.validate().is_err());

        config.payments.stripe_secret_key = "sk_test_abc".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_fee_over_one_hundred_percent() {
        let mut config = AppConfig::default();
        config.resale.fee_percent = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_malformed_currency() {
        let mut config = AppConfig::default();
        config.resale.currency = "pounds".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_nonpositive_expiry() {
        let mut config = AppConfig::default();
        config.transfers.expiry_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [rest]
            port = 9090

            [database]
            backend = "postgres"
            url = "postgres://db.internal/boxoffice"

            [resale]
            fee_percent = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.rest.port, 9090);
        assert_eq!(config.rest.host, "0.0.0.0");
        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert_eq!(config.resale.fee_percent, 10);
        assert_eq!(config.resale.currency, "gbp");
        assert_eq!(config.transfers.expiry_days, 7);
        assert_eq!(config.service_name, "boxoffice");
    }

    #[test]
    fn empty_toml_matches_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.rest.port, 8080);
        assert_eq!(config.auth.jwt_secret, "boxoffice-dev-secret");
        assert!(config.validate().is_ok());
    }
}
