//! Filedock retention daemon.
//!
//! Long-running process that connects to the metadata store and the version
//! blob store and runs the retention sweep on its configured cadence. The
//! checkout engine itself is a library consumed by the API layer; this
//! binary only hosts the background side.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use filedock_core::config::AppConfig;
use filedock_core::error::AppError;
use filedock_worker::{RetentionScheduler, RetentionSweeper};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let env = std::env::var("FILEDOCK_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Daemon error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main daemon run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Filedock retention daemon v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let db_pool = filedock_database::connection::create_pool(&config.database).await?;

    tracing::info!("Running database migrations...");
    filedock_database::migration::run_migrations(&db_pool).await?;

    tracing::info!(provider = %config.storage.provider, "Initializing version store...");
    let provider = filedock_storage::providers::from_config(&config.storage).await?;
    if !provider.health_check().await.unwrap_or(false) {
        tracing::warn!("Storage provider health check failed");
    }
    let store = Arc::new(filedock_storage::VersionStore::new(provider));

    let version_index = Arc::new(
        filedock_database::repositories::version::PgVersionIndex::new(db_pool),
    );
    let sweeper = Arc::new(RetentionSweeper::new(version_index, store));

    if !config.retention.enabled {
        tracing::info!("Retention sweep disabled; nothing to do");
        return Ok(());
    }

    let mut scheduler = RetentionScheduler::new(sweeper, config.retention.clone()).await?;
    scheduler.register_retention_sweep().await?;
    scheduler.start().await?;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping scheduler...");
    scheduler.shutdown().await?;

    tracing::info!("Filedock retention daemon shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
