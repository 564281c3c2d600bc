//! Advisory mutual-exclusion flag for scheduled jobs
//!
//! A lock is a named cache entry with a TTL: existence-checked before a job
//! runs, cleared on completion, auto-expiring if the holder dies. `has`
//! followed by `set` leaves a race window; the guarded jobs are idempotent
//! and low-frequency, so the window is tolerated rather than closed.

use crate::storage::{CacheData, SharedCacheStore, StorageError};

const LOCK_PREFIX: &str = "lock";

pub struct Lock {
    cache: SharedCacheStore,
}

impl Lock {
    pub fn new(cache: SharedCacheStore) -> Self {
        Self { cache }
    }

    /// Whether the named lock is currently held.
    pub async fn has(&self, name: &str) -> Result<bool, StorageError> {
        let value = self.cache.lock().await.get(LOCK_PREFIX, name).await?;
        Ok(value.is_some())
    }

    /// Take the named lock for up to `ttl_seconds`.
    pub async fn set(&self, name: &str, ttl_seconds: usize) -> Result<(), StorageError> {
        self.cache
            .lock()
            .await
            .put_with_ttl(
                LOCK_PREFIX,
                name,
                CacheData {
                    value: "true".to_string(),
                },
                ttl_seconds,
            )
            .await
    }

    /// Release the named lock.
    pub async fn clear(&self, name: &str) -> Result<(), StorageError> {
        self.cache.lock().await.remove(LOCK_PREFIX, name).await
    }
}
