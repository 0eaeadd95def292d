// 缓存模块
// 包含缓存接口、实现和操作逻辑

pub mod keys;
pub mod memory_store;
pub mod operations;
pub mod redis_store;
pub mod store;

// 重新导出常用类型和函数，方便其他模块使用
pub use memory_store::InMemoryCacheStore;
pub use operations::{RateLimitCacheOperations, SessionCacheOperations, UserCacheOperations};
pub use redis_store::RedisCacheStore;
pub use store::{CacheError, CacheStore};
