/// String value stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheData {
    pub value: String,
}
