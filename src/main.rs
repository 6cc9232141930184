//! ChurchHub server
//!
//! Main application entry point

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use ChurchHub::{
    api::{router, AppState},
    config::Settings,
    database::{create_pool, run_migrations, DatabaseConfig},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", ChurchHub::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&DatabaseConfig::from(&settings.database)).await?;

    // Run database migrations
    info!("Running database migrations...");
    run_migrations(&db_pool).await?;

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(&settings, db_pool)?;
    if services.redis_service.is_none() {
        info!("Redis disabled, import progress is kept in memory only");
    }

    let bind_address = settings.bind_address();
    let app = router(AppState::new(services, settings));

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!(address = %bind_address, "ChurchHub API is ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("ChurchHub has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
