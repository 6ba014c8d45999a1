//! Version metadata repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use filedock_core::error::{AppError, ErrorKind};
use filedock_core::result::AppResult;
use filedock_entity::file::FileVersion;

use crate::store::VersionIndex;

/// PostgreSQL-backed [`VersionIndex`].
#[derive(Debug, Clone)]
pub struct PgVersionIndex {
    pool: PgPool,
}

impl PgVersionIndex {
    /// Create a new version index over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionIndex for PgVersionIndex {
    async fn insert(&self, version: &FileVersion) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO file_versions \
             (file_id, project_id, version_number, created_by, created_at, retain, deleted) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(version.file_id)
        .bind(version.project_id)
        .bind(version.version_number)
        .bind(version.created_by)
        .bind(version.created_at)
        .bind(version.retain)
        .bind(version.deleted)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create file version", e)
        })?;
        Ok(())
    }

    async fn find(&self, file_id: Uuid, version_number: i32) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 AND version_number = $2",
        )
        .bind(file_id)
        .bind(version_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file version", e))
    }

    async fn list_for_file(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 ORDER BY version_number DESC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list file versions", e))
    }

    async fn set_retain(
        &self,
        file_id: Uuid,
        version_number: i32,
        retain: bool,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE file_versions SET retain = $3 WHERE file_id = $1 AND version_number = $2",
        )
        .bind(file_id)
        .bind(version_number)
        .bind(retain)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set retain flag", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_deleted(&self, file_id: Uuid, version_number: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE file_versions SET deleted = TRUE WHERE file_id = $1 AND version_number = $2",
        )
        .bind(file_id)
        .bind(version_number)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to tombstone version", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_sweepable(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions \
             WHERE deleted = FALSE AND retain = FALSE AND created_at < $1",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to scan sweepable versions", e)
        })
    }
}
