//! Version history and retention pinning.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use filedock_core::error::AppError;
use filedock_core::result::AppResult;
use filedock_core::traits::access::{AccessControl, ProjectRole};
use filedock_database::store::{FileStore, VersionIndex};
use filedock_entity::file::FileVersion;

use crate::context::RequestContext;

/// Manages a file's version history.
#[derive(Clone)]
pub struct VersionService {
    files: Arc<dyn FileStore>,
    versions: Arc<dyn VersionIndex>,
    access: Arc<dyn AccessControl>,
}

impl std::fmt::Debug for VersionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionService").finish()
    }
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        files: Arc<dyn FileStore>,
        versions: Arc<dyn VersionIndex>,
        access: Arc<dyn AccessControl>,
    ) -> Self {
        Self {
            files,
            versions,
            access,
        }
    }

    /// List all versions of a file, newest first. Tombstoned versions are
    /// included so history stays gapless.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        file_id: Uuid,
    ) -> AppResult<Vec<FileVersion>> {
        self.access
            .check_access(ctx.user_id, project_id, ProjectRole::Contributor)
            .await?;
        self.require_file(project_id, file_id).await?;
        self.versions.list_for_file(file_id).await
    }

    /// Pin or unpin a version. A retained version is never selected by the
    /// retention sweep, regardless of age.
    pub async fn set_retain(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        file_id: Uuid,
        version_number: i32,
        retain: bool,
    ) -> AppResult<()> {
        self.access
            .check_access(ctx.user_id, project_id, ProjectRole::Contributor)
            .await?;
        self.require_file(project_id, file_id).await?;

        let updated = self
            .versions
            .set_retain(file_id, version_number, retain)
            .await?;
        if !updated {
            return Err(AppError::not_found("Version does not exist"));
        }

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            version = version_number,
            retain,
            "Version retain flag set"
        );
        Ok(())
    }

    async fn require_file(&self, project_id: Uuid, file_id: Uuid) -> AppResult<()> {
        self.files
            .find(project_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File does not exist"))?;
        Ok(())
    }
}
