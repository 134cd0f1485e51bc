use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use moka::future::Cache;
use pay_guard::{
    config::Config,
    handlers::*,
    services::*,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting pay-guard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);

    // Connect Redis; degrade to the in-memory store if unreachable
    let redis = connect_redis(&config.redis_url).await;
    let store: Arc<dyn PaymentStore> = match redis.clone() {
        Some(conn) => Arc::new(RedisPaymentStore::new(conn)),
        None => {
            tracing::warn!("Running with in-memory payment store; records will not survive restart");
            Arc::new(MemoryPaymentStore::new())
        }
    };

    // Initialize services
    let verifier = Arc::new(SignatureVerifier::new(config.gateway.clone()));
    let alerter = Arc::new(OpsAlerter::new(config.alert_webhook_url.clone()));
    let reconciler = Arc::new(ReconciliationWriter::new(
        store.clone(),
        alerter.clone(),
        config.store_write_attempts,
    ));
    let analytics = Arc::new(Analytics::new(redis, alerter.clone()));

    // Replay memo for duplicate gateway redirects
    let recent = Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(15 * 60))
        .build();

    // Build application state
    let callback_state = CallbackState {
        verifier,
        reconciler,
        analytics: analytics.clone(),
        recent,
    };

    let initiate_state = InitiateState {
        store: store.clone(),
    };

    let health_state = HealthState {
        store: store.clone(),
        analytics: analytics.clone(),
    };

    // Per-IP rate limiting
    let governor_conf = Box::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .finish()
            .ok_or_else(|| {
                pay_guard::error::PayGuardError::ConfigError(
                    "Invalid rate limit configuration".to_string(),
                )
            })?,
    );

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .with_state(health_state)

        .route("/stats", get(get_stats))
        .with_state(analytics.clone())

        .route("/payments/initiate", post(initiate_payment))
        .with_state(initiate_state)

        // The gateway redirect: always answers with one of three cards
        .route("/payments/callback", get(payment_callback))
        .with_state(callback_state)

        // Global middleware
        .layer(GovernorLayer {
            config: Box::leak(governor_conf),
        })
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Callback endpoint: http://{}/payments/callback", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn connect_redis(redis_url: &str) -> Option<redis::aio::ConnectionManager> {
    match redis::Client::open(redis_url) {
        Ok(client) => match client.get_connection_manager().await {
            Ok(conn) => {
                tracing::info!("Redis connected successfully");
                Some(conn)
            }
            Err(e) => {
                tracing::warn!("Redis connection failed: {}", e);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Redis client creation failed: {}", e);
            None
        }
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl+c");
    tracing::info!("Shutting down gracefully...");
}
