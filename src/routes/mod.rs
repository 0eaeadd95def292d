use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};

use crate::{
    AppState,
    middleware::{RateLimiter, auth_middleware, log_errors, rate_limit, trace_requests},
};

pub mod auth;
pub mod health;
pub mod user;

/// 构建完整路由：公开路由、需认证路由与全局中间件
pub fn router(state: AppState) -> Router {
    let require_auth = from_fn_with_state(state.clone(), auth_middleware);
    let rate_limiter = Arc::new(RateLimiter::new(state.cache.clone(), &state.config));

    let api = Router::new()
        // 认证路由
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route(
            "/auth/logout",
            post(auth::logout).route_layer(require_auth.clone()),
        )
        .route("/auth/me", get(auth::me).route_layer(require_auth.clone()))
        // 用户路由，修改与删除需要认证
        .route("/users", post(user::create_user).get(user::list_users))
        .route(
            "/users/{id}",
            get(user::get_user).merge(
                put(user::update_user)
                    .delete(user::delete_user)
                    .route_layer(require_auth),
            ),
        );

    let base = state.config.api_base_uri.trim_matches('/');
    let router = if base.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(&format!("/{}", base), api)
    };

    router
        .route("/health", get(health::health))
        .layer(from_fn(log_errors))
        .layer(from_fn_with_state(rate_limiter, rate_limit))
        .layer(from_fn(trace_requests))
        .with_state(state)
}
