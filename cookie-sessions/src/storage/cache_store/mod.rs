mod memory;
mod redis;
mod types;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::storage::errors::StorageError;

pub use types::{CacheStore, InMemoryCacheStore, RedisCacheStore};

/// Cache handle shared between the session manager and the lock.
pub type SharedCacheStore = Arc<Mutex<Box<dyn CacheStore>>>;

pub fn shared_cache_store(store: Box<dyn CacheStore>) -> SharedCacheStore {
    Arc::new(Mutex::new(store))
}

/// Connect a cache store. `kind` is `"memory"` or `"redis"`.
///
/// When the Redis endpoint cannot be reached at construction the in-memory
/// store is returned instead, so callers keep a working (process-local)
/// cache and lock.
pub async fn connect_cache_store(
    kind: &str,
    url: &str,
) -> Result<Box<dyn CacheStore>, StorageError> {
    match kind {
        "memory" => Ok(Box::new(InMemoryCacheStore::new())),
        "redis" => {
            let store = ::redis::Client::open(url)
                .map(|client| RedisCacheStore { client })
                .map_err(StorageError::from)?;

            match store.init().await {
                Ok(()) => Ok(Box::new(store)),
                Err(e) => {
                    tracing::warn!(
                        "Redis cache at {url} unavailable ({e}), falling back to in-memory store"
                    );
                    Ok(Box::new(InMemoryCacheStore::new()))
                }
            }
        }
        t => Err(StorageError::Config(format!(
            "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
        ))),
    }
}
