//! The Version Store facade.
//!
//! Maps (project, file, version number) onto provider keys and enforces the
//! engine's error taxonomy at the blob boundary. Callers own the write
//! ordering: a blob must be written (and have succeeded) before the
//! matching metadata row is created.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use filedock_core::result::AppResult;
use filedock_core::traits::storage::{ByteStream, StorageProvider};

use crate::keys::version_object_key;

/// Durable, content-immutable storage of one blob per (file, version).
#[derive(Clone)]
pub struct VersionStore {
    provider: Arc<dyn StorageProvider>,
}

impl std::fmt::Debug for VersionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionStore")
            .field("provider", &self.provider.provider_type())
            .finish()
    }
}

impl VersionStore {
    /// Create a version store over the given provider.
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// Write the blob for a new version. Returns the object key.
    ///
    /// Fails with `ErrorKind::StorageWrite` on I/O failure; the caller must
    /// not advance file state in that case.
    pub async fn put_version(
        &self,
        project_id: Uuid,
        file_id: Uuid,
        version_number: i32,
        content: Bytes,
    ) -> AppResult<String> {
        let key = version_object_key(project_id, file_id, version_number);
        self.provider.write(&key, content).await?;
        debug!(%file_id, version_number, "Stored version blob");
        Ok(key)
    }

    /// Read a version blob as a lazily-consumed byte stream.
    ///
    /// Fails with `ErrorKind::NotFound` if the blob was deleted or never
    /// existed.
    pub async fn get_version(
        &self,
        project_id: Uuid,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<ByteStream> {
        let key = version_object_key(project_id, file_id, version_number);
        self.provider.read(&key).await
    }

    /// Remove a version blob. Idempotent: deleting an already-absent blob
    /// is not an error, so a partially-failed sweep can simply retry.
    pub async fn delete_version(
        &self,
        project_id: Uuid,
        file_id: Uuid,
        version_number: i32,
    ) -> AppResult<()> {
        let key = version_object_key(project_id, file_id, version_number);
        self.provider.delete(&key).await?;
        debug!(%file_id, version_number, "Deleted version blob");
        Ok(())
    }
}
