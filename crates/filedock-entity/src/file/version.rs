//! File version metadata entity.
//!
//! The blob itself lives in the version store under the deterministic key
//! derived from (project, file, version number); this row carries the
//! retention and tombstone flags the sweeper operates on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata for one immutable version of a file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileVersion {
    /// The file this version belongs to.
    pub file_id: Uuid,
    /// The project the file belongs to (part of the blob key).
    pub project_id: Uuid,
    /// Sequential version number, starting at 1.
    pub version_number: i32,
    /// User who produced this version.
    pub created_by: Uuid,
    /// When this version was produced.
    pub created_at: DateTime<Utc>,
    /// When true the sweeper never deletes this version, regardless of age.
    pub retain: bool,
    /// True once the blob has been reclaimed. The row itself is kept as a
    /// tombstone so version numbering and audit history stay intact.
    pub deleted: bool,
}

impl FileVersion {
    /// Metadata for a freshly pushed (or initial) version.
    pub fn new(
        file_id: Uuid,
        project_id: Uuid,
        version_number: i32,
        created_by: Uuid,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            file_id,
            project_id,
            version_number,
            created_by,
            created_at,
            retain: false,
            deleted: false,
        }
    }
}
