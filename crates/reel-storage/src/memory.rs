//! In-process object store.
//!
//! Keeps objects in memory, counts calls per operation and can be told to
//! fail specific operations. Used for local runs without a bucket and as the
//! storage fake in tests.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Default URL prefix of presigned memory URLs.
pub const DEFAULT_MEMORY_BASE_URL: &str = "https://storage.local/memory";

/// Operations a [`MemoryStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Download,
    Upload,
    Presign,
    Delete,
}

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-memory [`ObjectStore`].
#[derive(Debug)]
pub struct MemoryStore {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
    failures: RwLock<HashSet<StoreOperation>>,
    downloads: AtomicUsize,
    uploads: AtomicUsize,
    deletes: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_MEMORY_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashSet::new()),
            downloads: AtomicUsize::new(0),
            uploads: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Store an object directly.
    pub fn insert(&self, key: impl Into<String>, data: Vec<u8>, content_type: impl Into<String>) {
        let object = StoredObject {
            data,
            content_type: content_type.into(),
        };
        self.objects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), object);
    }

    /// Fetch a stored object.
    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Make every later call of `operation` fail.
    pub fn fail(&self, operation: StoreOperation) {
        self.failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(operation);
    }

    /// Number of download calls made so far.
    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Key a URL minted by [`ObjectStore::presign_get`] resolves to.
    pub fn key_for_url(&self, url: &str) -> Option<String> {
        let rest = url.strip_prefix(&self.base_url)?.strip_prefix('/')?;
        let key = rest.split('?').next()?;
        self.contains(key).then(|| key.to_string())
    }

    fn check(&self, operation: StoreOperation) -> StorageResult<()> {
        let failing = self
            .failures
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&operation);
        if !failing {
            return Ok(());
        }
        Err(match operation {
            StoreOperation::Download => StorageError::download_failed("injected failure"),
            StoreOperation::Upload => StorageError::upload_failed("injected failure"),
            StoreOperation::Presign => StorageError::PresignFailed("injected failure".to_string()),
            StoreOperation::Delete => StorageError::delete_failed("injected failure"),
        })
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn download_file(&self, key: &str, path: &Path) -> StorageResult<u64> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.check(StoreOperation::Download)?;

        let object = self.get(key).ok_or_else(|| StorageError::not_found(key))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &object.data).await?;

        debug!("Downloaded {} ({} bytes) from memory", key, object.data.len());
        Ok(object.data.len() as u64)
    }

    async fn upload_file(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<()> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.check(StoreOperation::Upload)?;

        let data = tokio::fs::read(path).await?;
        self.insert(key, data, content_type);
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        self.check(StoreOperation::Presign)?;
        Ok(format!(
            "{}/{}?expires={}",
            self.base_url,
            key,
            expires_in.as_secs()
        ))
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check(StoreOperation::Delete)?;

        self.objects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        Ok(())
    }
}
