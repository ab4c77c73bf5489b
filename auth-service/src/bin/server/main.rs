use std::sync::Arc;
use std::time::Duration as StdDuration;

use auth::Authenticator;
use auth::PasswordCost;
use auth::SystemClock;
use auth_service::config::Config;
use auth_service::domain::auth::service::AuthService;
use auth_service::domain::session::service::RefreshTokenManager;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::http::router::AppState;
use auth_service::inbound::scheduler::spawn_cleanup;
use auth_service::outbound::repositories::PostgresCredentialStore;
use auth_service::outbound::repositories::PostgresRefreshTokenStore;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        issuer = %config.jwt.issuer,
        access_token_ttl_hours = config.jwt.access_token_ttl_hours,
        refresh_token_ttl_days = config.refresh_token.ttl_days,
        rotation = config.refresh_token.rotation,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(StdDuration::from_secs(config.database.acquire_timeout_seconds))
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let clock = Arc::new(SystemClock);
    let authenticator = Arc::new(
        Authenticator::new(config.jwt.secret.as_bytes(), &config.jwt.issuer)
            .with_password_cost(PasswordCost::from(&config.password))?
            .with_access_token_ttl(Duration::hours(config.jwt.access_token_ttl_hours))
            .with_leeway(config.jwt.leeway_seconds)
            .with_clock(clock.clone()),
    );

    let credential_store = Arc::new(PostgresCredentialStore::new(pg_pool.clone()));
    let refresh_token_store = Arc::new(PostgresRefreshTokenStore::new(pg_pool));

    let sessions = Arc::new(RefreshTokenManager::new(
        refresh_token_store,
        clock,
        Duration::days(config.refresh_token.ttl_days),
        Duration::hours(config.refresh_token.retention_hours),
    ));

    let auth_service = Arc::new(AuthService::new(
        credential_store,
        Arc::clone(&sessions),
        Arc::clone(&authenticator),
        config.refresh_token.rotation,
    ));

    let shutdown = CancellationToken::new();

    let cleanup = spawn_cleanup(
        sessions,
        StdDuration::from_secs(config.refresh_token.cleanup_interval_seconds),
        config.store.timeout(),
        shutdown.clone(),
    );
    tracing::info!(
        interval_seconds = config.refresh_token.cleanup_interval_seconds,
        "Refresh token cleanup scheduled"
    );

    let http_address = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(AppState {
        auth_service,
        authenticator,
        store_timeout: config.store.timeout(),
        shutdown: shutdown.clone(),
    });

    let signal = shutdown.clone();
    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Err(e) = cleanup.await {
        tracing::error!(error = %e, "Cleanup task ended abnormally");
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
