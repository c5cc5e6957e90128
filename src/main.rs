//! # Boxoffice
//!
//! Main entry point for the marketplace service.
//!
//! Loads configuration, selects the storage and payment backends, and
//! serves the REST API until Ctrl+C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing::{error, info};

use boxoffice::api::middleware::auth::AuthConfig;
use boxoffice::api::rest::handlers::AppState;
use boxoffice::api::rest::routes::create_router;
use boxoffice::application::services::{
    Clock, EventPublisher, LoggingPublisher, ResaleMarketConfig, ResaleMarketService, SystemClock,
    TicketTransferService, TransferConfig,
};
use boxoffice::config::{AppConfig, LogFormat, PaymentProvider, StorageBackend};
use boxoffice::infrastructure::payments::{
    PaymentGateway, SimulatedGateway, SimulatorConfig, StripeConfig, StripeGateway,
};
use boxoffice::infrastructure::persistence::{
    InMemoryMarketplaceStore, InMemoryUserDirectory, MarketplaceStore, PostgresMarketplaceStore,
    PostgresUserDirectory, UserDirectory,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;

    init_tracing(&config);

    info!(
        environment = %config.environment,
        "Starting {} v{}",
        config.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let (store, users) = build_storage(&config).await?;
    let gateway = build_gateway(&config)?;
    let publisher: Arc<dyn EventPublisher> = Arc::new(LoggingPublisher);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let market = Arc::new(ResaleMarketService::with_config(
        Arc::clone(&store),
        gateway,
        Arc::clone(&publisher),
        Arc::clone(&clock),
        ResaleMarketConfig {
            fee_percent: config.resale.fee_percent,
            currency: config.resale.currency.clone(),
        },
    ));
    let transfers = Arc::new(TicketTransferService::with_config(
        store,
        users,
        publisher,
        clock,
        TransferConfig {
            expiry_days: config.transfers.expiry_days,
            claim_link_base_url: config.transfers.claim_link_base_url.clone(),
        },
    ));

    let state = Arc::new(AppState { market, transfers });
    let auth = Arc::new(build_auth(&config));
    let app = create_router(state, auth, &config.rest);

    let addr = config
        .rest
        .socket_addr()
        .context("resolving listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(address = %addr, "REST server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving REST API")?;

    info!("Shutting down {}", config.service_name);
    Ok(())
}

/// Initializes the tracing subscriber from the logging configuration.
///
/// `RUST_LOG` takes precedence over the configured level when set.
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.log.include_target);

    match config.log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

/// Builds the storage backend selected by the configuration.
async fn build_storage(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn MarketplaceStore>, Arc<dyn UserDirectory>)> {
    match config.database.backend {
        StorageBackend::Memory => {
            info!("using in-memory storage");
            Ok((
                Arc::new(InMemoryMarketplaceStore::new()),
                Arc::new(InMemoryUserDirectory::new()),
            ))
        }
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
                .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
                .connect(&config.database.url)
                .await
                .context("connecting to postgres")?;
            info!("connected to postgres");
            Ok((
                Arc::new(PostgresMarketplaceStore::new(pool.clone())),
                Arc::new(PostgresUserDirectory::new(pool)),
            ))
        }
    }
}

/// Builds the payment gateway selected by the configuration.
fn build_gateway(config: &AppConfig) -> anyhow::Result<Arc<dyn PaymentGateway>> {
    match config.payments.provider {
        PaymentProvider::Simulated => {
            info!("using simulated payment gateway");
            Ok(Arc::new(SimulatedGateway::new(SimulatorConfig::default())))
        }
        PaymentProvider::Stripe => {
            let mut stripe = StripeConfig::new(config.payments.stripe_secret_key.clone());
            if let Some(base_url) = &config.payments.stripe_base_url {
                stripe = stripe.with_base_url(base_url.clone());
            }
            let gateway = StripeGateway::new(stripe).context("building stripe client")?;
            info!("using stripe payment gateway");
            Ok(Arc::new(gateway))
        }
    }
}

/// Builds the bearer token validation settings.
fn build_auth(config: &AppConfig) -> AuthConfig {
    let mut auth = AuthConfig::new(config.auth.jwt_secret.clone());
    if let Some(issuer) = &config.auth.issuer {
        auth = auth.with_issuer(issuer.clone());
    }
    if let Some(audience) = &config.auth.audience {
        auth = auth.with_audience(audience.clone());
    }
    auth
}

/// Completes when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down gracefully"),
        () = terminate => info!("received SIGTERM, shutting down gracefully"),
    }
}
