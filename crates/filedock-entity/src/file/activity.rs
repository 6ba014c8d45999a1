//! Checkout activity records.
//!
//! Activities are immutable once written. The newest-first activity log
//! embedded in [`super::FileRecord`] is both the audit trail and the
//! concurrency token: the head record alone determines checkout state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of checkout state transition an activity records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Acquire an exclusive edit hold.
    Pull,
    /// Commit a new version and release the hold.
    Push,
    /// Release the hold without committing.
    Cancel,
}

/// One state transition on a file.
///
/// Unknown fields are rejected on deserialization; the activity log is a
/// strict boundary, not a loose map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Activity {
    /// The transition performed.
    pub kind: ActivityKind,
    /// The user who performed it.
    pub actor_id: Uuid,
    /// When it was performed.
    pub created_at: DateTime<Utc>,
    /// The version the activity applies to: the version held for Pull and
    /// Cancel, the newly produced version for Push.
    pub file_version: i32,
    /// Caller-supplied note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared intent to finish by this time. Pull only; advisory, never
    /// enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_at: Option<DateTime<Utc>>,
    /// For Push and Cancel: the `created_at` of the Pull being resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulled_at: Option<DateTime<Utc>>,
}

impl Activity {
    /// Build a Pull activity acquiring a hold at `held_version`.
    pub fn pull(
        actor_id: Uuid,
        held_version: i32,
        estimated_completion_at: Option<DateTime<Utc>>,
        description: Option<String>,
    ) -> Self {
        Self {
            kind: ActivityKind::Pull,
            actor_id,
            created_at: Utc::now(),
            file_version: held_version,
            description,
            estimated_completion_at,
            pulled_at: None,
        }
    }

    /// Build a Push activity producing `new_version`, resolving the Pull
    /// made at `pulled_at`.
    pub fn push(
        actor_id: Uuid,
        new_version: i32,
        pulled_at: DateTime<Utc>,
        description: Option<String>,
    ) -> Self {
        Self {
            kind: ActivityKind::Push,
            actor_id,
            created_at: Utc::now(),
            file_version: new_version,
            description,
            estimated_completion_at: None,
            pulled_at: Some(pulled_at),
        }
    }

    /// Build a Cancel activity releasing the hold at `held_version`,
    /// resolving the Pull made at `pulled_at`.
    pub fn cancel(
        actor_id: Uuid,
        held_version: i32,
        pulled_at: DateTime<Utc>,
        description: Option<String>,
    ) -> Self {
        Self {
            kind: ActivityKind::Cancel,
            actor_id,
            created_at: Utc::now(),
            file_version: held_version,
            description,
            estimated_completion_at: None,
            pulled_at: Some(pulled_at),
        }
    }

    /// Whether this activity is an unresolved Pull.
    pub fn is_open_pull(&self) -> bool {
        self.kind == ActivityKind::Pull
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_records_pull_time() {
        let actor = Uuid::new_v4();
        let pulled_at = Utc::now();
        let push = Activity::push(actor, 2, pulled_at, None);
        assert_eq!(push.kind, ActivityKind::Push);
        assert_eq!(push.file_version, 2);
        assert_eq!(push.pulled_at, Some(pulled_at));
        assert!(push.estimated_completion_at.is_none());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{
            "kind": "pull",
            "actor_id": "4b4a1a6a-8e8f-4a5e-9d8a-0f3c2a1b4c5d",
            "created_at": "2024-05-01T00:00:00Z",
            "file_version": 1,
            "surprise": true
        }"#;
        assert!(serde_json::from_str::<Activity>(json).is_err());
    }
}
