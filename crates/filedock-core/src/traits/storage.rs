//! Storage provider trait for pluggable version-blob backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading blob contents.
///
/// Streams are lazily consumed, finite, and not restartable; callers must
/// drain or drop them.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for version-blob storage backends.
///
/// Implementations exist for the local filesystem and S3. The
/// [`StorageProvider`] trait is defined here in `filedock-core` and
/// implemented in `filedock-storage`. Blobs are written exactly once and
/// never rewritten; the only mutation after creation is deletion.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read a blob and return its byte stream.
    ///
    /// Fails with `ErrorKind::NotFound` when no blob exists at `key`.
    async fn read(&self, key: &str) -> AppResult<ByteStream>;

    /// Read a blob into memory as a complete byte vector.
    async fn read_bytes(&self, key: &str) -> AppResult<Bytes>;

    /// Write bytes to the given key.
    async fn write(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Delete the blob at the given key.
    ///
    /// Deleting an absent blob is not an error; this supports retrying a
    /// partially-failed sweep.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a blob exists at the given key.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}
