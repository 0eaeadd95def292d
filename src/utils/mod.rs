use axum::Json;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::api::models::common::ApiResponse;
use crate::error::IdentityError;

/// 密码哈希与校验（bcrypt）
#[derive(Debug, Clone, Copy)]
pub struct PasswordCodec {
    cost: u32,
}

impl PasswordCodec {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, IdentityError> {
        bcrypt::hash(password.as_bytes(), self.cost)
            .map_err(|e| IdentityError::Internal(format!("password hash failed: {}", e)))
    }

    /// 不匹配返回 false；存储的摘要损坏时同样返回 false
    pub fn verify(&self, digest: &str, password: &str) -> bool {
        match bcrypt::verify(password.as_bytes(), digest) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!("Stored password digest could not be verified: {}", e);
                false
            }
        }
    }
}

impl Default for PasswordCodec {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

/// 规范化分页参数，返回 (page, per_page, offset)
pub fn normalize_page(page: i64, per_page: i64) -> (i64, i64, i64) {
    let page = page.max(1);
    let per_page = if per_page < 1 { 10 } else { per_page };
    (page, per_page, (page - 1).saturating_mul(per_page))
}

/// 向上取整的总页数；参数来自查询串，不能溢出
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    let (total, per_page) = (total.max(0), per_page.max(1));
    total / per_page + i64::from(total % per_page != 0)
}

/// 令牌指纹，日志中代替原始令牌
pub fn token_fingerprint(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .take(6)
        .map(|b| format!("{:02x}", b))
        .collect()
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const USER_EXISTS: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const NOT_FOUND: i32 = 1004;
    pub const RATE_LIMIT: i32 = 1005;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const CACHE_UNAVAILABLE: i32 = 5003;
}
