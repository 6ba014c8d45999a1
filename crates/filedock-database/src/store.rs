//! Metadata store traits.
//!
//! The file table and the version table have different write disciplines:
//! the file record is mutated only through [`FileStore::append_activity`],
//! a single conditional write that serializes all checkout transitions per
//! file; version rows are written once and thereafter touched only on the
//! disjoint `retain` and `deleted` flags.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use filedock_core::result::AppResult;
use filedock_entity::file::{Activity, FileRecord, FileVersion};

/// A checkout transition to apply atomically to a file record.
#[derive(Debug, Clone)]
pub struct ActivityAppend {
    /// The activity to prepend to the log.
    pub activity: Activity,
    /// New `current_version`, set on Push only.
    pub new_version: Option<i32>,
    /// New `last_modified_at`, set on Push only.
    pub modified_at: Option<DateTime<Utc>>,
}

impl ActivityAppend {
    /// A transition that only appends (Pull, Cancel).
    pub fn record(activity: Activity) -> Self {
        Self {
            activity,
            new_version: None,
            modified_at: None,
        }
    }

    /// A Push transition: append, bump the version, stamp the modify time.
    pub fn commit(activity: Activity, new_version: i32) -> Self {
        let modified_at = activity.created_at;
        Self {
            activity,
            new_version: Some(new_version),
            modified_at: Some(modified_at),
        }
    }
}

/// Storage for file records and their embedded activity logs.
#[async_trait]
pub trait FileStore: Send + Sync + 'static {
    /// Find a live (non-deleted) file by project and ID.
    async fn find(&self, project_id: Uuid, file_id: Uuid) -> AppResult<Option<FileRecord>>;

    /// Find a live file by project and name (duplicate checking).
    async fn find_by_name(&self, project_id: Uuid, name: &str) -> AppResult<Option<FileRecord>>;

    /// Insert a new file record.
    async fn insert(&self, file: &FileRecord) -> AppResult<()>;

    /// List all live files in a project, ordered by name.
    async fn list_by_project(&self, project_id: Uuid) -> AppResult<Vec<FileRecord>>;

    /// Update the descriptive fields of a file. Returns false when the file
    /// does not exist or is deleted.
    async fn update_details(
        &self,
        project_id: Uuid,
        file_id: Uuid,
        name: &str,
        description: Option<&str>,
        tags: &[String],
    ) -> AppResult<bool>;

    /// Soft-delete a file. Returns false when it does not exist or is
    /// already deleted.
    async fn mark_deleted(&self, project_id: Uuid, file_id: Uuid) -> AppResult<bool>;

    /// Apply a checkout transition, conditional on the activity log still
    /// holding exactly `expected_len` entries.
    ///
    /// The log is append-only, so its length is a monotonic per-file
    /// counter: equality proves no other transition landed since the caller
    /// read the record. Returns false when the condition no longer holds
    /// (the caller lost a race and should re-read state).
    async fn append_activity(
        &self,
        project_id: Uuid,
        file_id: Uuid,
        expected_len: usize,
        change: ActivityAppend,
    ) -> AppResult<bool>;
}

/// Storage for per-version metadata rows.
#[async_trait]
pub trait VersionIndex: Send + Sync + 'static {
    /// Insert the metadata row for a freshly written version.
    async fn insert(&self, version: &FileVersion) -> AppResult<()>;

    /// Find one version of a file (tombstones included).
    async fn find(&self, file_id: Uuid, version_number: i32) -> AppResult<Option<FileVersion>>;

    /// List all versions of a file, newest first (tombstones included).
    async fn list_for_file(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>>;

    /// Set or clear the retain flag. Returns false when the version does
    /// not exist.
    async fn set_retain(&self, file_id: Uuid, version_number: i32, retain: bool) -> AppResult<bool>;

    /// Tombstone a version after its blob has been reclaimed. Returns false
    /// when the version does not exist.
    async fn mark_deleted(&self, file_id: Uuid, version_number: i32) -> AppResult<bool>;

    /// All versions eligible for sweeping: not deleted, not retained, and
    /// created strictly before `cutoff`.
    async fn find_sweepable(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<FileVersion>>;
}
