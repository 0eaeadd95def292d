use std::time::Duration;

use async_trait::async_trait;

/// 缓存错误；键不存在不是错误
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cached value could not be (de)serialized: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}

/// 带 TTL 的键值缓存
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
    /// 未命中返回 `Ok(None)`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    /// 返回实际删除的键数
    async fn delete(&self, keys: &[&str]) -> Result<u64, CacheError>;
    /// 返回存在的键数
    async fn exists(&self, keys: &[&str]) -> Result<u64, CacheError>;
    /// 剩余存活时间；键不存在或没有过期时间都返回 `None`
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError>;
    /// 键不存在时返回 false
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;
    /// 自增并返回新值，不存在的键从 0 开始
    async fn increment(&self, key: &str) -> Result<i64, CacheError>;
}
