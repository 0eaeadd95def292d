// 数据库模块
// 包含数据库实体定义和存储库操作

pub mod models; // 数据库实体定义
pub mod repositories; // 存储库接口与实现

pub use models::user::{NewUser, UserEntity};
pub use repositories::user::{PgUserRepository, UserRepository};
pub use repositories::memory::InMemoryUserRepository;

/// 存储层错误，“未找到”与其他失败区分开
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("email already taken")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            other => StoreError::Database(other),
        }
    }
}
