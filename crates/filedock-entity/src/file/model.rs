//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::activity::{Activity, ActivityKind};

/// A logical document under version control.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    /// Unique file identifier.
    pub id: Uuid,
    /// The project this file belongs to.
    pub project_id: Uuid,
    /// The file name (including extension).
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Descriptive tags.
    pub tags: Vec<String>,
    /// MIME type of the file content.
    pub mime_type: Option<String>,
    /// Current version number. Starts at 1, incremented by exactly 1 on
    /// every successful push.
    pub current_version: i32,
    /// Timestamp of the most recent successful push; `None` until then.
    pub last_modified_at: Option<DateTime<Utc>>,
    /// Checkout activity log, newest first. Append-only.
    pub activities: Json<Vec<Activity>>,
    /// Soft-delete flag. Once set the file is invisible to all operations.
    pub is_deleted: bool,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
}

/// Checkout state of a file, derived from the head of its activity log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckoutState {
    /// No open hold; the file may be pulled.
    Free,
    /// Held for editing by exactly one user.
    Held {
        /// The holder.
        by: Uuid,
        /// The version current when the hold was acquired.
        since_version: i32,
        /// When the hold was acquired.
        since: DateTime<Utc>,
        /// The holder's declared completion estimate (advisory).
        estimated_completion_at: Option<DateTime<Utc>>,
    },
}

impl FileRecord {
    /// A freshly created file: version 1, never modified, empty log.
    pub fn create(
        project_id: Uuid,
        name: String,
        description: Option<String>,
        tags: Vec<String>,
        mime_type: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            name,
            description,
            tags,
            mime_type,
            current_version: 1,
            last_modified_at: None,
            activities: Json(vec![]),
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    /// The activity log as a slice, newest first.
    pub fn activity_log(&self) -> &[Activity] {
        &self.activities.0
    }

    /// The most recent activity, if any.
    pub fn head_activity(&self) -> Option<&Activity> {
        self.activities.0.first()
    }

    /// Derive the checkout state from the activity-log head.
    ///
    /// A head Pull is an open hold; any other head (or an empty log) means
    /// the file is free. Push and Cancel both resolve the preceding Pull,
    /// so inspecting one record suffices.
    pub fn checkout_state(&self) -> CheckoutState {
        match self.head_activity() {
            Some(head) if head.kind == ActivityKind::Pull => CheckoutState::Held {
                by: head.actor_id,
                since_version: head.file_version,
                since: head.created_at,
                estimated_completion_at: head.estimated_completion_at,
            },
            _ => CheckoutState::Free,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(activities: Vec<Activity>) -> FileRecord {
        FileRecord {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            name: "drawing.dwg".to_string(),
            description: None,
            tags: vec![],
            mime_type: None,
            current_version: 1,
            last_modified_at: None,
            activities: Json(activities),
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_file_is_free() {
        assert_eq!(file_with(vec![]).checkout_state(), CheckoutState::Free);
    }

    #[test]
    fn test_head_pull_means_held() {
        let actor = Uuid::new_v4();
        let pull = Activity::pull(actor, 1, None, None);
        let since = pull.created_at;
        let file = file_with(vec![pull]);
        assert_eq!(
            file.checkout_state(),
            CheckoutState::Held {
                by: actor,
                since_version: 1,
                since,
                estimated_completion_at: None,
            }
        );
    }

    #[test]
    fn test_head_cancel_means_free() {
        let actor = Uuid::new_v4();
        let pull = Activity::pull(actor, 1, None, None);
        let cancel = Activity::cancel(actor, 1, pull.created_at, None);
        let file = file_with(vec![cancel, pull]);
        assert_eq!(file.checkout_state(), CheckoutState::Free);
    }

    #[test]
    fn test_head_push_means_free() {
        let actor = Uuid::new_v4();
        let pull = Activity::pull(actor, 1, None, None);
        let push = Activity::push(actor, 2, pull.created_at, None);
        let file = file_with(vec![push, pull]);
        assert_eq!(file.checkout_state(), CheckoutState::Free);
    }
}
