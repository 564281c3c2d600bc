use async_trait::async_trait;
use std::collections::HashMap;
use tokio::time::Instant;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

pub struct InMemoryCacheStore {
    pub(super) entry: HashMap<String, (CacheData, Option<Instant>)>,
}

pub struct RedisCacheStore {
    pub(super) client: redis::Client,
}

// Trait
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a value into the store.
    async fn put(&mut self, prefix: &str, key: &str, value: CacheData)
    -> Result<(), StorageError>;

    /// Put a value into the store with a TTL in seconds.
    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError>;

    /// Get a value from the store. Expired entries read as absent.
    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError>;

    /// Remove a value from the store.
    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError>;
}
