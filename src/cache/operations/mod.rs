/// 缓存操作
/// 提供缓存操作的功能实现

// 用户缓存操作
pub mod user;

pub mod rate_limit;
pub mod session;

// 重新导出常用操作
pub use rate_limit::RateLimitCacheOperations;
pub use session::SessionCacheOperations;
pub use user::UserCacheOperations;
