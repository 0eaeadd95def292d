use std::time::Duration;

use crate::cache::keys::user_keys;
use crate::cache::store::{CacheError, CacheStore};

/// 会话缓存操作，键为 `user_session:<id>`，值为原始令牌
pub struct SessionCacheOperations;

impl SessionCacheOperations {
    /// 登记会话
    pub async fn cache_session(
        cache: &dyn CacheStore,
        user_id: i64,
        token: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        cache
            .set(&user_keys::user_session_key(user_id), token, ttl)
            .await
    }

    pub async fn session_exists(cache: &dyn CacheStore, user_id: i64) -> Result<bool, CacheError> {
        let key = user_keys::user_session_key(user_id);
        Ok(cache.exists(&[key.as_str()]).await? > 0)
    }

    /// 删除会话，返回是否确实存在过
    pub async fn remove_session(cache: &dyn CacheStore, user_id: i64) -> Result<bool, CacheError> {
        let key = user_keys::user_session_key(user_id);
        Ok(cache.delete(&[key.as_str()]).await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory_store::InMemoryCacheStore;

    #[tokio::test]
    async fn session_lifecycle() {
        let cache = InMemoryCacheStore::new();
        let ttl = Duration::from_secs(60);

        assert!(!SessionCacheOperations::session_exists(&cache, 3).await.unwrap());
        SessionCacheOperations::cache_session(&cache, 3, "tok", ttl).await.unwrap();
        assert_eq!(cache.get("user_session:3").await.unwrap().as_deref(), Some("tok"));
        assert!(SessionCacheOperations::session_exists(&cache, 3).await.unwrap());

        assert!(SessionCacheOperations::remove_session(&cache, 3).await.unwrap());
        assert!(!SessionCacheOperations::remove_session(&cache, 3).await.unwrap());
        assert_eq!(cache.get("user_session:3").await.unwrap(), None);
    }
}
