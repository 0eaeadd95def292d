use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::user::UserEntity;
use crate::error::AppError;

/// 用户对外信息，不含密码摘要
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserEntity> for UserProfile {
    fn from(user: &UserEntity) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// 创建用户 / 注册请求
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        if self.password.chars().count() < 6 {
            return Err(AppError::Validation("密码长度不能少于6个字符".into()));
        }
        Ok(())
    }
}

/// 更新用户请求，空字段表示不修改
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            validate_name(name)?;
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            validate_email(email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::Validation("邮箱和密码不能为空".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: UserProfile,
}

/// 当前会话信息
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserProfile,
    /// 会话登记是否仍在缓存中
    pub session_active: bool,
}

fn validate_name(name: &str) -> Result<(), AppError> {
    let len = name.trim().chars().count();
    if !(2..=100).contains(&len) {
        return Err(AppError::Validation("用户名长度必须在2到100个字符之间".into()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::Validation("邮箱格式无效".into()));
    }
    Ok(())
}
