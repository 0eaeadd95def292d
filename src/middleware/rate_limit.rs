use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    cache::{CacheStore, RateLimitCacheOperations},
    config::Config,
    error::AppError,
};

/// 按客户端 IP 的固定窗口限流，计数存放在缓存中
#[derive(Clone)]
pub struct RateLimiter {
    cache: Arc<dyn CacheStore>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn CacheStore>, config: &Config) -> Self {
        Self {
            cache,
            window: config.rate_limit_window(),
            max_requests: config.rate_limit_requests,
        }
    }

    pub async fn check_rate_limit(&self, req: Request<Body>, next: Next) -> Response {
        let ip = client_ip(&req);

        match RateLimitCacheOperations::increment_rate_limit(self.cache.as_ref(), &ip, self.window)
            .await
        {
            Ok(count) if count > self.max_requests as i64 => {
                tracing::warn!("Rate limit exceeded for {} ({} requests)", ip, count);
                return AppError::RateLimited(self.window.as_secs()).into_response();
            }
            Ok(_) => {}
            // 缓存故障时放行
            Err(e) => tracing::warn!("Rate limit check skipped for {}: {}", ip, e),
        }

        next.run(req).await
    }
}

/// 优先取代理头，其次取连接地址
fn client_ip(req: &Request<Body>) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    limiter.check_rate_limit(req, next).await
}
