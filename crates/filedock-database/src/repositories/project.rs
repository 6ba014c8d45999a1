//! Read-only adapter over the collaboration layer's project table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use filedock_core::error::{AppError, ErrorKind};
use filedock_core::result::AppResult;
use filedock_core::traits::access::{AccessControl, ProjectGrant, ProjectRole};

/// PostgreSQL-backed [`AccessControl`].
///
/// Project rows are owned and written by the collaboration layer; this
/// adapter only reads membership to answer access checks.
#[derive(Debug, Clone)]
pub struct PgProjectDirectory {
    pool: PgPool,
}

impl PgProjectDirectory {
    /// Create a new project directory over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessControl for PgProjectDirectory {
    async fn check_access(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        required: ProjectRole,
    ) -> AppResult<ProjectGrant> {
        let row: Option<(Uuid, Vec<Uuid>)> =
            sqlx::query_as("SELECT owner_id, contributor_ids FROM projects WHERE id = $1")
                .bind(project_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to load project", e)
                })?;

        let (owner_id, contributor_ids) =
            row.ok_or_else(|| AppError::not_found("Project does not exist"))?;

        let grant = ProjectGrant {
            project_id,
            owner_id,
            contributor_ids,
        };

        if !grant.permits(user_id, required) {
            return Err(AppError::not_authorized("You are not authorized"));
        }

        Ok(grant)
    }
}
