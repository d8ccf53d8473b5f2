//! The object storage capability.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageResult;

/// Durable object storage used by the render pipeline.
///
/// Implemented by [`crate::R2Client`] for any S3-compatible backend and by
/// [`crate::MemoryStore`] for local runs and tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download object `key` into the file at `path`, returning its size.
    async fn download_file(&self, key: &str, path: &Path) -> StorageResult<u64>;

    /// Upload the file at `path` as object `key`.
    async fn upload_file(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<()>;

    /// Mint a read-only URL for `key` valid for `expires_in`.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Delete object `key`.
    async fn delete_object(&self, key: &str) -> StorageResult<()>;

    /// Verify the backend is reachable.
    async fn check_connectivity(&self) -> StorageResult<()>;
}
