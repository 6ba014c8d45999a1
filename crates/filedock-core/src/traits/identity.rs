//! Identity-lookup seam to the user directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::result::AppResult;

/// Display identity of a user, used to decorate activity records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    /// The user's ID.
    pub user_id: Uuid,
    /// Human-readable display name.
    pub display_name: String,
    /// Contact email.
    pub email: String,
}

/// Batch lookup of user display identities.
///
/// Lookups are best-effort: callers degrade to undecorated records on
/// failure instead of failing the whole request.
#[async_trait]
pub trait IdentityLookup: Send + Sync + 'static {
    /// Resolve the given user IDs. Unknown IDs are simply absent from the
    /// result; order is unspecified.
    async fn lookup_users(&self, user_ids: &[Uuid]) -> AppResult<Vec<UserIdentity>>;
}
