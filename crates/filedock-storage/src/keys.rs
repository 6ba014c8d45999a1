//! Deterministic object keys for version blobs.

use uuid::Uuid;

/// The storage key for one version of a file.
///
/// Keys are content-addressed by position, not by hash: the version number
/// is the identity, and a key never changes meaning once written.
pub fn version_object_key(project_id: Uuid, file_id: Uuid, version_number: i32) -> String {
    format!("{project_id}/{file_id}_v{version_number}")
}
