//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use filedock_core::error::{AppError, ErrorKind};
use filedock_core::result::AppResult;
use filedock_entity::file::FileRecord;

use crate::store::{ActivityAppend, FileStore};

/// PostgreSQL-backed [`FileStore`].
#[derive(Debug, Clone)]
pub struct PgFileStore {
    pool: PgPool,
}

impl PgFileStore {
    /// Create a new file store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for PgFileStore {
    async fn find(&self, project_id: Uuid, file_id: Uuid) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT * FROM files WHERE project_id = $1 AND id = $2 AND is_deleted = FALSE",
        )
        .bind(project_id)
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_by_name(&self, project_id: Uuid, name: &str) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT * FROM files WHERE project_id = $1 AND name = $2 AND is_deleted = FALSE",
        )
        .bind(project_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file by name", e))
    }

    async fn insert(&self, file: &FileRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO files \
             (id, project_id, name, description, tags, mime_type, current_version, \
              last_modified_at, activities, is_deleted, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(file.id)
        .bind(file.project_id)
        .bind(&file.name)
        .bind(&file.description)
        .bind(&file.tags)
        .bind(&file.mime_type)
        .bind(file.current_version)
        .bind(file.last_modified_at)
        .bind(&file.activities)
        .bind(file.is_deleted)
        .bind(file.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("files_project_name_live_idx") =>
            {
                AppError::conflict(format!("File '{}' already exists", file.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create file", e),
        })?;
        Ok(())
    }

    async fn list_by_project(&self, project_id: Uuid) -> AppResult<Vec<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT * FROM files WHERE project_id = $1 AND is_deleted = FALSE ORDER BY name ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn update_details(
        &self,
        project_id: Uuid,
        file_id: Uuid,
        name: &str,
        description: Option<&str>,
        tags: &[String],
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE files SET name = $3, description = $4, tags = $5 \
             WHERE project_id = $1 AND id = $2 AND is_deleted = FALSE",
        )
        .bind(project_id)
        .bind(file_id)
        .bind(name)
        .bind(description)
        .bind(tags)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_deleted(&self, project_id: Uuid, file_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE files SET is_deleted = TRUE \
             WHERE project_id = $1 AND id = $2 AND is_deleted = FALSE",
        )
        .bind(project_id)
        .bind(file_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_activity(
        &self,
        project_id: Uuid,
        file_id: Uuid,
        expected_len: usize,
        change: ActivityAppend,
    ) -> AppResult<bool> {
        // Compare-and-swap on the activity-log length: the UPDATE applies
        // only if no other transition landed since the caller read the
        // record. jsonb_build_array(..) || activities prepends (newest
        // first).
        let result = sqlx::query(
            "UPDATE files \
             SET activities = jsonb_build_array($4::jsonb) || activities, \
                 current_version = COALESCE($5, current_version), \
                 last_modified_at = COALESCE($6, last_modified_at) \
             WHERE project_id = $1 AND id = $2 AND is_deleted = FALSE \
               AND jsonb_array_length(activities) = $3",
        )
        .bind(project_id)
        .bind(file_id)
        .bind(expected_len as i32)
        .bind(Json(&change.activity))
        .bind(change.new_version)
        .bind(change.modified_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append activity", e))?;
        Ok(result.rows_affected() > 0)
    }
}
