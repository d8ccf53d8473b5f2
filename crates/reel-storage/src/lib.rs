//! S3-compatible object storage.
//!
//! This crate provides:
//! - `R2Client`: upload/download, presigned URLs and deletion over the S3 API
//! - `ObjectStore`: the storage capability the render pipeline depends on
//! - `MemoryStore`: an in-process store for local runs and tests
//! - `StorageLayout`: object key layout for canvas sources and rendered videos
//! - Time-limited read access URLs

pub mod client;
pub mod delivery;
pub mod error;
pub mod keys;
pub mod memory;
pub mod store;

pub use client::{R2Client, R2Config};
pub use delivery::{grant_access, AccessPolicy, AccessUrl, MAX_EXPIRY_SECS};
pub use error::{StorageError, StorageResult};
pub use keys::StorageLayout;
pub use memory::{MemoryStore, StoreOperation};
pub use store::ObjectStore;
