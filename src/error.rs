use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::auth::TokenError;
use crate::cache::CacheError;
use crate::database::StoreError;
use crate::utils::{error_codes, error_to_api_response};

/// 身份服务的领域错误
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("user with this email already exists")]
    DuplicateEmail,
    #[error("user not found")]
    NotFound,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authentication failed: {0}")]
    Unauthenticated(#[from] TokenError),
    #[error("cache unavailable: {0}")]
    CacheUnavailable(#[from] CacheError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for IdentityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => IdentityError::NotFound,
            StoreError::DuplicateEmail => IdentityError::DuplicateEmail,
            StoreError::Database(e) => IdentityError::Internal(e.to_string()),
        }
    }
}

/// HTTP 层错误
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
    #[error("rate limited, retry in {0}s")]
    RateLimited(u64),
}

impl AppError {
    fn parts(&self) -> (StatusCode, i32, String) {
        match self {
            AppError::Identity(err) => match err {
                IdentityError::DuplicateEmail => (
                    StatusCode::CONFLICT,
                    error_codes::USER_EXISTS,
                    "用户已存在".into(),
                ),
                IdentityError::NotFound => (
                    StatusCode::NOT_FOUND,
                    error_codes::NOT_FOUND,
                    "用户不存在".into(),
                ),
                IdentityError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    error_codes::AUTH_FAILED,
                    "邮箱或密码错误".into(),
                ),
                IdentityError::Unauthenticated(_) => (
                    StatusCode::UNAUTHORIZED,
                    error_codes::AUTH_FAILED,
                    "令牌无效".into(),
                ),
                IdentityError::CacheUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    error_codes::CACHE_UNAVAILABLE,
                    "缓存服务不可用".into(),
                ),
                IdentityError::Internal(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    "内部服务器错误".into(),
                ),
            },
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                error_codes::VALIDATION_ERROR,
                msg.clone(),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                (*msg).to_string(),
            ),
            AppError::RateLimited(window) => (
                StatusCode::TOO_MANY_REQUESTS,
                error_codes::RATE_LIMIT,
                format!("请求过于频繁，请在{}秒后重试", window),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, msg) = self.parts();

        // 内部细节只进日志，不返回给调用方
        match &self {
            AppError::Identity(IdentityError::Internal(detail)) => {
                tracing::error!("Internal error: {}", detail);
            }
            AppError::Identity(IdentityError::Unauthenticated(reason)) => {
                tracing::warn!("Authentication failed: {}", reason);
            }
            _ => {}
        }

        (status, error_to_api_response::<()>(code, msg)).into_response()
    }
}
