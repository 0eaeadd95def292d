use std::time::Duration;

use crate::api::models::user::UserProfile;
use crate::cache::keys::user_keys;
use crate::cache::store::{CacheError, CacheStore};

/// 用户缓存操作
pub struct UserCacheOperations;

impl UserCacheOperations {
    /// 将用户对外信息写入缓存
    pub async fn cache_user(
        cache: &dyn CacheStore,
        user: &UserProfile,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let json = serde_json::to_string(user)?;
        cache.set(&user_keys::user_cache_key(user.id), &json, ttl).await
    }

    /// 从缓存获取用户信息，未命中返回 None
    pub async fn get_cached_user(
        cache: &dyn CacheStore,
        user_id: i64,
    ) -> Result<Option<UserProfile>, CacheError> {
        let key = user_keys::user_cache_key(user_id);
        match cache.get(&key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 从缓存中删除用户
    pub async fn remove_user_from_cache(
        cache: &dyn CacheStore,
        user_id: i64,
    ) -> Result<(), CacheError> {
        let key = user_keys::user_cache_key(user_id);
        cache.delete(&[key.as_str()]).await?;
        Ok(())
    }
}
