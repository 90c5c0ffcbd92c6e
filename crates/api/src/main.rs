use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aerosamec_api::bootstrap::{ensure_primary_admin, BootstrapOutcome};
use aerosamec_api::config::ServerConfig;
use aerosamec_api::router::build_app_router;
use aerosamec_api::state::AppState;
use aerosamec_notify::{EmailConfig, Notifier};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aerosamec_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = aerosamec_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    aerosamec_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    aerosamec_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Primary admin ---
    let bootstrap_password = std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok();
    match ensure_primary_admin(&pool, &config.primary_admin_email, bootstrap_password.as_deref())
        .await
    {
        Ok(BootstrapOutcome::Created(id)) => tracing::info!(user_id = id, "Bootstrapped primary admin"),
        Ok(_) => {}
        Err(e) => panic!("Failed to bootstrap primary admin: {e}"),
    }

    // --- Email ---
    let notifier = Notifier::new(EmailConfig::from_env(), &config.app_base_url);
    if notifier.is_smtp_enabled() {
        tracing::info!("SMTP delivery enabled");
    } else {
        tracing::warn!("SMTP_HOST not set; account emails will only be logged");
    }

    // --- App ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );

    let state = AppState {
        pool,
        config: Arc::new(config),
        notifier: Arc::new(notifier),
    };
    let app = build_app_router(state);

    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
