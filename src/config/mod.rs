use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 配置加载错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub user_cache_ttl_secs: u64,
    pub session_cache_ttl_secs: u64,
    pub bcrypt_cost: u32,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub log_format: LogFormat,
}

impl Config {
    /// 从 `.env` 与进程环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        // JWT_EXPIRATION 允许 "24h" 这种写法
        let jwt_expiration_hours = match lookup("JWT_EXPIRATION") {
            Some(raw) => raw
                .trim()
                .trim_end_matches('h')
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid {
                    key: "JWT_EXPIRATION",
                    value: raw.clone(),
                })?,
            None => 24,
        };

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.to_string(),
                });
            }
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            redis_url: required("REDIS_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration_hours * 3600,
            user_cache_ttl_secs: parse_or(&lookup, "USER_CACHE_TTL", 30 * 60)?,
            session_cache_ttl_secs: parse_or(&lookup, "SESSION_CACHE_TTL", 24 * 3600)?,
            bcrypt_cost,
            rate_limit_window_secs: parse_or(&lookup, "RATE_LIMIT_WINDOW", 60)?,
            rate_limit_requests: parse_or(&lookup, "RATE_LIMIT_REQUESTS", 100)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            api_base_uri: lookup("API_BASE_URI").unwrap_or_else(|| "/api/v1".into()),
            log_format,
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn user_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.user_cache_ttl_secs)
    }

    pub fn session_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.session_cache_ttl_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw })
        }
        _ => Ok(default),
    }
}
