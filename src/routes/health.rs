use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::{AppState, utils::success_to_api_response};

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    /// 服务器时间
    pub timestamp: i64,
    /// 缓存是否可达
    pub cache: bool,
}

/// 健康检查接口；缓存不可达不影响返回状态
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let cache = state.cache.exists(&["health:probe"]).await.is_ok();

    (
        StatusCode::OK,
        success_to_api_response(HealthResponse {
            status: "ok",
            service: env!("CARGO_PKG_NAME"),
            timestamp: chrono::Utc::now().timestamp(),
            cache,
        }),
    )
}
