//! Read-only adapter over the collaboration layer's user table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use filedock_core::error::{AppError, ErrorKind};
use filedock_core::result::AppResult;
use filedock_core::traits::identity::{IdentityLookup, UserIdentity};

/// PostgreSQL-backed [`IdentityLookup`].
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Create a new user directory over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityLookup for PgUserDirectory {
    async fn lookup_users(&self, user_ids: &[Uuid]) -> AppResult<Vec<UserIdentity>> {
        let rows: Vec<(Uuid, String, String)> =
            sqlx::query_as("SELECT id, display_name, email FROM users WHERE id = ANY($1)")
                .bind(user_ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to look up users", e)
                })?;

        Ok(rows
            .into_iter()
            .map(|(user_id, display_name, email)| UserIdentity {
                user_id,
                display_name,
                email,
            })
            .collect())
    }
}
