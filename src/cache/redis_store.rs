use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::cache::store::{CacheError, CacheStore};

/// Redis 缓存；连接为共享的多路复用连接，断线自动重连
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: ConnectionManager,
}

impl RedisCacheStore {
    pub async fn connect(client: redis::Client) -> Result<Self, CacheError> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.pset_ex(key, value, ttl_millis(ttl)).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn delete(&self, keys: &[&str]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(keys).await?;
        Ok(removed)
    }

    async fn exists(&self, keys: &[&str]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        let count: u64 = conn.exists(keys).await?;
        Ok(count)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        let mut conn = self.conn.clone();
        // -2 键不存在，-1 没有过期时间
        let millis: i64 = conn.pttl(key).await?;
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let applied: bool = conn.pexpire(key, ttl_millis(ttl) as i64).await?;
        Ok(applied)
    }

    async fn increment(&self, key: &str) -> Result<i64, CacheError> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, 1).await?;
        Ok(value)
    }
}
