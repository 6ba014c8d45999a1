//! File lifecycle operations around the checkout engine.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use filedock_core::error::AppError;
use filedock_core::result::AppResult;
use filedock_core::traits::access::{AccessControl, ProjectRole};
use filedock_core::traits::identity::IdentityLookup;
use filedock_database::store::{FileStore, VersionIndex};
use filedock_entity::file::{FileRecord, FileVersion};
use filedock_storage::VersionStore;

use crate::context::RequestContext;
use crate::file::activity::{ActivityView, decorate};

/// Handles file creation, lookup, update, and soft deletion.
#[derive(Clone)]
pub struct FileService {
    files: Arc<dyn FileStore>,
    versions: Arc<dyn VersionIndex>,
    store: Arc<VersionStore>,
    access: Arc<dyn AccessControl>,
    identity: Arc<dyn IdentityLookup>,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService").finish()
    }
}

/// Data for creating a new file.
#[derive(Debug, Clone)]
pub struct CreateFileRequest {
    /// The project the file belongs to.
    pub project_id: Uuid,
    /// File name (including extension).
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Descriptive tags.
    pub tags: Vec<String>,
    /// MIME type of the content.
    pub mime_type: Option<String>,
    /// Initial content; becomes version 1.
    pub content: Bytes,
}

/// Data for updating a file's descriptive fields.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateFileRequest {
    /// New file name.
    pub name: String,
    /// New description.
    pub description: Option<String>,
    /// New tags.
    pub tags: Vec<String>,
}

/// A file with its decorated activity log and version history.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileDetails {
    /// The file record.
    pub file: FileRecord,
    /// Decorated activity log, newest first.
    pub activities: Vec<ActivityView>,
    /// Version history, newest first (tombstones included).
    pub versions: Vec<FileVersion>,
}

impl FileService {
    /// Creates a new file service.
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

    /// Create a new file. The supplied content becomes version 1.
    pub async fn create_file(
        &self,
        ctx: &RequestContext,
        req: CreateFileRequest,
    ) -> AppResult<FileRecord> {
        self.access
            .check_access(ctx.user_id, req.project_id, ProjectRole::Owner)
            .await?;

        if req.name.trim().is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }
        if self
            .files
            .find_by_name(req.project_id, &req.name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("File already exists"));
        }

        let file = FileRecord::create(
            req.project_id,
            req.name,
            req.description,
            req.tags,
            req.mime_type,
        );

        // Blob before metadata, same ordering as a push.
        self.store
            .put_version(file.project_id, file.id, 1, req.content)
            .await?;
        self.files.insert(&file).await?;
        self.versions
            .insert(&FileVersion::new(
                file.id,
                file.project_id,
                1,
                ctx.user_id,
                file.created_at,
            ))
            .await?;

        info!(user_id = %ctx.user_id, file_id = %file.id, "File created");

        Ok(file)
    }

    /// Get a file with its decorated activity log and version history.
    pub async fn get_file(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        file_id: Uuid,
    ) -> AppResult<FileDetails> {
        self.access
            .check_access(ctx.user_id, project_id, ProjectRole::Contributor)
            .await?;

        let file = self
            .files
            .find(project_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File does not exist"))?;

        let activities =
            decorate(self.identity.as_ref(), file.activity_log().to_vec()).await;
        let versions = self.versions.list_for_file(file_id).await?;

        Ok(FileDetails {
            file,
            activities,
            versions,
        })
    }

    /// List all live files in a project.
    pub async fn list_files(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
    ) -> AppResult<Vec<FileRecord>> {
        self.access
            .check_access(ctx.user_id, project_id, ProjectRole::Contributor)
            .await?;
        self.files.list_by_project(project_id).await
    }

    /// Update a file's descriptive fields.
    pub async fn update_file(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        file_id: Uuid,
        req: UpdateFileRequest,
    ) -> AppResult<()> {
        self.access
            .check_access(ctx.user_id, project_id, ProjectRole::Owner)
            .await?;

        if req.name.trim().is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }
        if let Some(existing) = self.files.find_by_name(project_id, &req.name).await? {
            if existing.id != file_id {
                return Err(AppError::conflict("File already exists"));
            }
        }

        let updated = self
            .files
            .update_details(
                project_id,
                file_id,
                &req.name,
                req.description.as_deref(),
                &req.tags,
            )
            .await?;
        if !updated {
            return Err(AppError::not_found("File does not exist"));
        }

        info!(user_id = %ctx.user_id, file_id = %file_id, "File updated");
        Ok(())
    }

    /// Soft-delete a file. Version metadata and blobs stay behind until the
    /// retention sweep ages them out.
    pub async fn delete_file(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        file_id: Uuid,
    ) -> AppResult<()> {
        self.access
            .check_access(ctx.user_id, project_id, ProjectRole::Owner)
            .await?;

        let deleted = self.files.mark_deleted(project_id, file_id).await?;
        if !deleted {
            return Err(AppError::not_found("File does not exist"));
        }

        info!(user_id = %ctx.user_id, file_id = %file_id, "File deleted");
        Ok(())
    }
}
