//! One-shot retention sweep.
//!
//! Runs a single sweep pass and exits; meant for external schedulers (cron,
//! CI) as an alternative to the in-process daemon.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use filedock_core::config::AppConfig;
use filedock_core::error::AppError;
use filedock_worker::RetentionSweeper;

/// Run one retention sweep pass and exit.
#[derive(Debug, Parser)]
#[command(name = "filedock-sweep")]
struct Args {
    /// Override the configured version lifetime in whole days.
    #[arg(long)]
    lifetime_days: Option<u32>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let env = std::env::var("FILEDOCK_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run(config, args).await {
        tracing::error!("Sweep failed: {e}");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig, args: Args) -> Result<(), AppError> {
    let lifetime_days = args.lifetime_days.unwrap_or(config.retention.lifetime_days);

    let db_pool = filedock_database::connection::create_pool(&config.database).await?;
    let provider = filedock_storage::providers::from_config(&config.storage).await?;
    let store = Arc::new(filedock_storage::VersionStore::new(provider));
    let version_index = Arc::new(
        filedock_database::repositories::version::PgVersionIndex::new(db_pool),
    );

    let sweeper = RetentionSweeper::new(version_index, store);
    let report = sweeper.run(lifetime_days).await?;

    tracing::info!(
        scanned = report.scanned,
        deleted = report.deleted,
        failed = report.failed,
        "Sweep complete"
    );
    Ok(())
}
