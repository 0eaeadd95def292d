use std::time::Duration;

use crate::cache::keys::user_keys;
use crate::cache::store::{CacheError, CacheStore};

/// 速率限制缓存操作
pub struct RateLimitCacheOperations;

impl RateLimitCacheOperations {
    /// 计数加一；第一次请求或计数器缺少过期时间时设置窗口
    pub async fn increment_rate_limit(
        cache: &dyn CacheStore,
        client: &str,
        window: Duration,
    ) -> Result<i64, CacheError> {
        let key = user_keys::rate_limit_key(client);
        let count = cache.increment(&key).await?;
        if count == 1 || cache.ttl(&key).await?.is_none() {
            cache.expire(&key, window).await?;
        }
        Ok(count)
    }
}
