//! Time-limited read access to published objects.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;
use crate::store::ObjectStore;

/// Default access URL lifetime (7 days).
pub const DEFAULT_ACCESS_EXPIRY_SECS: u64 = 604800;

/// Maximum allowed expiry (7 days), the S3 presigning limit.
pub const MAX_EXPIRY_SECS: u64 = 604800;

/// How long granted URLs stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    expiry: Duration,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::from_secs(DEFAULT_ACCESS_EXPIRY_SECS)
    }
}

impl AccessPolicy {
    /// Policy with an expiry of `secs`, clamped to `1..=MAX_EXPIRY_SECS`.
    pub fn from_secs(secs: u64) -> Self {
        Self {
            expiry: Duration::from_secs(secs.clamp(1, MAX_EXPIRY_SECS)),
        }
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }
}

/// A granted, time-limited read URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessUrl {
    /// The signed URL.
    pub url: String,
    /// Object the URL resolves to.
    pub key: String,
    /// When this URL expires.
    pub expires_at: DateTime<Utc>,
    /// Expiry in seconds from issue time.
    pub expires_in_secs: u64,
}

impl AccessUrl {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Mint a read-only URL for `key` under `policy`.
pub async fn grant_access(
    store: &dyn ObjectStore,
    key: &str,
    policy: &AccessPolicy,
) -> StorageResult<AccessUrl> {
    let issued_at = Utc::now();
    let url = store.presign_get(key, policy.expiry()).await?;
    let expires_in_secs = policy.expiry().as_secs();

    Ok(AccessUrl {
        url,
        key: key.to_string(),
        expires_at: issued_at + chrono::Duration::seconds(expires_in_secs as i64),
        expires_in_secs,
    })
}
