//! The retention sweeper.
//!
//! Reclaims storage from versions that are past their configured lifetime,
//! not retained, and not already deleted. Each candidate is processed
//! independently: the blob is deleted first, then the metadata row is
//! tombstoned. A crash between the two steps leaves a version whose blob is
//! gone but whose row still reads "not deleted"; the next run re-deletes
//! the absent blob (a no-op) and completes the tombstone. The two-step
//! ordering must not be reversed.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use tracing::{info, warn};

use filedock_core::result::AppResult;
use filedock_database::store::VersionIndex;
use filedock_storage::VersionStore;

/// Outcome of one sweep run.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct SweepReport {
    /// Candidate versions selected for deletion.
    pub scanned: usize,
    /// Versions whose blob was reclaimed and row tombstoned.
    pub deleted: usize,
    /// Versions skipped after a failure; retried on the next run.
    pub failed: usize,
}

/// Scans version metadata and reclaims expired blobs.
#[derive(Clone)]
pub struct RetentionSweeper {
    versions: Arc<dyn VersionIndex>,
    store: Arc<VersionStore>,
}

impl std::fmt::Debug for RetentionSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionSweeper").finish()
    }
}

impl RetentionSweeper {
    /// Creates a new sweeper.
    pub fn new(versions: Arc<dyn VersionIndex>, store: Arc<VersionStore>) -> Self {
        Self { versions, store }
    }

    /// Run one sweep pass with the given lifetime in whole days.
    ///
    /// Per-version failures are logged and skipped; only a failure to scan
    /// candidates aborts the run.
    pub async fn run(&self, lifetime_days: u32) -> AppResult<SweepReport> {
        let cutoff = sweep_cutoff(Utc::now(), lifetime_days);
        info!(lifetime_days, %cutoff, "Retention sweep started");

        let candidates = self.versions.find_sweepable(cutoff).await?;

        let mut report = SweepReport {
            scanned: candidates.len(),
            ..SweepReport::default()
        };

        for version in &candidates {
            // Blob first: if the tombstone write is lost, re-deleting the
            // absent blob next run is a no-op.
            if let Err(e) = self
                .store
                .delete_version(version.project_id, version.file_id, version.version_number)
                .await
            {
                warn!(
                    file_id = %version.file_id,
                    version = version.version_number,
                    "Cannot delete version blob, skipping: {e}"
                );
                report.failed += 1;
                continue;
            }

            match self
                .versions
                .mark_deleted(version.file_id, version.version_number)
                .await
            {
                Ok(_) => report.deleted += 1,
                Err(e) => {
                    warn!(
                        file_id = %version.file_id,
                        version = version.version_number,
                        "Cannot tombstone version row, will retry next run: {e}"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            scanned = report.scanned,
            deleted = report.deleted,
            failed = report.failed,
            "Retention sweep finished"
        );
        Ok(report)
    }
}

/// The expiry cutoff: `lifetime_days` before `now`, floored to the start of
/// that UTC day. Versions created strictly before the cutoff are eligible.
pub fn sweep_cutoff(now: DateTime<Utc>, lifetime_days: u32) -> DateTime<Utc> {
    (now - Duration::days(i64::from(lifetime_days)))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}
