/// 用户信息缓存键前缀
const USER_PREFIX: &str = "user:";

/// 用户会话缓存键前缀
const USER_SESSION_PREFIX: &str = "user_session:";

/// 限流计数键前缀
const RATE_LIMIT_PREFIX: &str = "rate_limit:";

/// 生成用户信息缓存键
pub fn user_cache_key(user_id: i64) -> String {
    format!("{}{}", USER_PREFIX, user_id)
}

/// 生成用户会话缓存键
pub fn user_session_key(user_id: i64) -> String {
    format!("{}{}", USER_SESSION_PREFIX, user_id)
}

pub fn rate_limit_key(client: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, client)
}
