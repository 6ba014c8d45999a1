//! Cron scheduler for the periodic retention sweep.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use filedock_core::config::retention::RetentionConfig;
use filedock_core::error::AppError;

use crate::sweeper::RetentionSweeper;

/// Cron-based scheduler that runs the retention sweep.
pub struct RetentionScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// The sweeper to run.
    sweeper: Arc<RetentionSweeper>,
    /// Retention settings (schedule and lifetime).
    config: RetentionConfig,
}

impl std::fmt::Debug for RetentionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionScheduler").finish()
    }
}

impl RetentionScheduler {
    /// Create a new scheduler.
    pub async fn new(
        sweeper: Arc<RetentionSweeper>,
        config: RetentionConfig,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::unknown(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            sweeper,
            config,
        })
    }

    /// Register the retention sweep task.
    pub async fn register_retention_sweep(&self) -> Result<(), AppError> {
        let sweeper = Arc::clone(&self.sweeper);
        let lifetime_days = self.config.lifetime_days;

        let job = CronJob::new_async(self.config.schedule.as_str(), move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            Box::pin(async move {
                if let Err(e) = sweeper.run(lifetime_days).await {
                    tracing::error!("Retention sweep failed: {e}");
                }
            })
        })
        .map_err(|e| AppError::unknown(format!("Failed to create sweep schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::unknown(format!("Failed to add sweep schedule: {e}")))?;

        tracing::info!(
            schedule = %self.config.schedule,
            lifetime_days = self.config.lifetime_days,
            "Registered: retention_sweep"
        );
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::unknown(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::unknown(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
