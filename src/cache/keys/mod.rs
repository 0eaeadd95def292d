/// 缓存键模块
/// 提供各种缓存键生成函数

// 用户缓存键模块
pub mod user_keys;

pub use user_keys::{rate_limit_key, user_cache_key, user_session_key};
