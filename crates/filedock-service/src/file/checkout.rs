//! The checkout state machine: pull, push, cancel.
//!
//! Exclusivity is enforced purely by activity-log inspection — the head
//! record is both the audit trail and the concurrency token. Every
//! transition is applied through one conditional write on the file record
//! (`FileStore::append_activity`), so two racing transitions cannot both
//! land: the loser observes a stale log length and surfaces a conflict.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use filedock_core::error::AppError;
use filedock_core::result::AppResult;
use filedock_core::traits::access::{AccessControl, ProjectRole};
use filedock_core::traits::identity::IdentityLookup;
use filedock_database::store::{ActivityAppend, FileStore, VersionIndex};
use filedock_entity::file::{Activity, CheckoutState, FileRecord, FileVersion};
use filedock_storage::VersionStore;

use crate::context::RequestContext;
use crate::file::activity::{ActivityView, decorate_one};

/// Attempts for the version-row insert that follows a committed push.
const VERSION_INSERT_ATTEMPTS: u32 = 3;

/// Serializes checkout transitions on files.
#[derive(Clone)]
pub struct CheckoutService {
    files: Arc<dyn FileStore>,
    versions: Arc<dyn VersionIndex>,
    store: Arc<VersionStore>,
    access: Arc<dyn AccessControl>,
    identity: Arc<dyn IdentityLookup>,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService").finish()
    }
}

impl CheckoutService {
    /// Creates a new checkout service.
    pub fn new(
        files: Arc<dyn FileStore>,
        versions: Arc<dyn VersionIndex>,
        store: Arc<VersionStore>,
        access: Arc<dyn AccessControl>,
        identity: Arc<dyn IdentityLookup>,
    ) -> Self {
        Self {
            files,
            versions,
            store,
            access,
            identity,
        }
    }

    /// Acquire an exclusive edit hold on a file.
    ///
    /// `estimated_completion_at` is the caller's declared intent to finish
    /// by that time; it is advisory and never enforced.
    pub async fn pull(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        file_id: Uuid,
        estimated_completion_at: Option<DateTime<Utc>>,
        description: Option<String>,
    ) -> AppResult<ActivityView> {
        self.access
            .check_access(ctx.user_id, project_id, ProjectRole::Contributor)
            .await?;
        let file = self.load(project_id, file_id).await?;

        if let CheckoutState::Held { .. } = file.checkout_state() {
            return Err(AppError::already_pulled("File is already pulled"));
        }

        let activity = Activity::pull(
            ctx.user_id,
            file.current_version,
            estimated_completion_at,
            description,
        );
        self.apply(&file, ActivityAppend::record(activity.clone()))
            .await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            version = file.current_version,
            "File pulled"
        );

        Ok(decorate_one(self.identity.as_ref(), activity).await)
    }

    /// Commit a new version of a held file and release the hold.
    pub async fn push(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        file_id: Uuid,
        content: Bytes,
        description: Option<String>,
    ) -> AppResult<ActivityView> {
        self.access
            .check_access(ctx.user_id, project_id, ProjectRole::Contributor)
            .await?;
        let file = self.load(project_id, file_id).await?;

        let since = match file.checkout_state() {
            CheckoutState::Held { by, since, .. } if by == ctx.user_id => since,
            _ => return Err(AppError::not_pulled("File is not pulled by you")),
        };

        // Defensive staleness check: with the conditional append below, a
        // push landing after this hold began should be impossible.
        if file.last_modified_at.is_some_and(|t| t > since) {
            return Err(AppError::stale_version("File was modified after this pull"));
        }

        // Blob first, metadata second. A failed blob write aborts the whole
        // transition: no activity is appended and no version number is
        // consumed.
        let new_version = file.current_version + 1;
        self.store
            .put_version(project_id, file_id, new_version, content)
            .await?;

        let activity = Activity::push(ctx.user_id, new_version, since, description);
        self.apply(&file, ActivityAppend::commit(activity.clone(), new_version))
            .await?;

        self.insert_version_row(FileVersion::new(
            file_id,
            project_id,
            new_version,
            ctx.user_id,
            activity.created_at,
        ))
        .await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            version = new_version,
            "File pushed"
        );

        Ok(decorate_one(self.identity.as_ref(), activity).await)
    }

    /// Release a hold without committing a new version.
    pub async fn cancel(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        file_id: Uuid,
        description: Option<String>,
    ) -> AppResult<ActivityView> {
        self.access
            .check_access(ctx.user_id, project_id, ProjectRole::Contributor)
            .await?;
        let file = self.load(project_id, file_id).await?;

        let (since_version, since) = match file.checkout_state() {
            CheckoutState::Free => {
                return Err(AppError::not_pulled("File has not been pulled"));
            }
            CheckoutState::Held { by, .. } if by != ctx.user_id => {
                return Err(AppError::already_pulled(
                    "File is pulled by another user",
                ));
            }
            CheckoutState::Held {
                since_version,
                since,
                ..
            } => (since_version, since),
        };

        let activity = Activity::cancel(ctx.user_id, since_version, since, description);
        self.apply(&file, ActivityAppend::record(activity.clone()))
            .await?;

        info!(user_id = %ctx.user_id, file_id = %file_id, "Pull cancelled");

        Ok(decorate_one(self.identity.as_ref(), activity).await)
    }

    /// Load a live file or fail with not-found.
    async fn load(&self, project_id: Uuid, file_id: Uuid) -> AppResult<FileRecord> {
        self.files
            .find(project_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File does not exist"))
    }

    /// Apply one transition conditionally on the state `file` was read at.
    async fn apply(&self, file: &FileRecord, change: ActivityAppend) -> AppResult<()> {
        let applied = self
            .files
            .append_activity(file.project_id, file.id, file.activity_log().len(), change)
            .await?;
        if !applied {
            warn!(file_id = %file.id, "Checkout transition lost a race");
            return Err(AppError::conflict(
                "File state changed concurrently; re-read and retry",
            ));
        }
        Ok(())
    }

    /// Insert the version metadata row for a committed push.
    ///
    /// At this point the blob exists and the file record already references
    /// the new version, so the insert is retried before giving up; a blob
    /// with no metadata row is an orphan that only a repair pass can
    /// reclaim.
    async fn insert_version_row(&self, row: FileVersion) -> AppResult<()> {
        let mut attempt = 1;
        loop {
            match self.versions.insert(&row).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < VERSION_INSERT_ATTEMPTS => {
                    warn!(
                        file_id = %row.file_id,
                        version = row.version_number,
                        attempt,
                        "Version metadata insert failed, retrying: {e}"
                    );
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        file_id = %row.file_id,
                        version = row.version_number,
                        "Version metadata insert failed; blob is orphaned pending repair: {e}"
                    );
                    return Err(e);
                }
            }
        }
    }
}
