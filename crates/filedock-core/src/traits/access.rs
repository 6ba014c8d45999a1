//! Access-control seam to the project/collaboration layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::result::AppResult;

/// Role required to perform an operation on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    /// The project owner. Owners pass contributor checks as well.
    Owner,
    /// Any collaborator listed on the project, or the owner.
    Contributor,
}

/// The project membership returned by a successful access check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectGrant {
    /// The project the grant applies to.
    pub project_id: Uuid,
    /// The project owner.
    pub owner_id: Uuid,
    /// All non-owner collaborators.
    pub contributor_ids: Vec<Uuid>,
}

/// Authorization checks against the (external) project collaboration layer.
///
/// The engine calls this before every state transition and treats a failure
/// as a fatal precondition: no transition is applied.
#[async_trait]
pub trait AccessControl: Send + Sync + 'static {
    /// Verify that `user_id` holds `required` on `project_id`.
    ///
    /// Fails with `ErrorKind::NotFound` when the project does not exist and
    /// `ErrorKind::NotAuthorized` when the user lacks the role.
    async fn check_access(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        required: ProjectRole,
    ) -> AppResult<ProjectGrant>;
}

impl ProjectGrant {
    /// Whether `user_id` satisfies `required` under this grant.
    pub fn permits(&self, user_id: Uuid, required: ProjectRole) -> bool {
        match required {
            ProjectRole::Owner => self.owner_id == user_id,
            ProjectRole::Contributor => {
                self.owner_id == user_id || self.contributor_ids.contains(&user_id)
            }
        }
    }
}
