use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::StoreError;
use crate::database::models::user::{NewUser, UserEntity};

/// 用户持久化接口
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 插入新用户；邮箱冲突返回 `StoreError::DuplicateEmail`
    async fn create(&self, user: NewUser) -> Result<UserEntity, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError>;
    /// 按 ID 升序分页，同时返回总数
    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<UserEntity>, i64), StoreError>;
    async fn update(&self, user: &UserEntity) -> Result<UserEntity, StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// 用户存储库实现（PostgreSQL）
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<UserEntity, StoreError> {
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => {
                tracing::debug!("Inserted user {}", user.id);
                Ok(user)
            }
            Err(e) => {
                let err = StoreError::from(e);
                if !matches!(err, StoreError::DuplicateEmail) {
                    tracing::error!("Failed to insert user: {:?}", err);
                }
                Err(err)
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, StoreError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<UserEntity>, i64), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let users = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((users, total))
    }

    async fn update(&self, user: &UserEntity) -> Result<UserEntity, StoreError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET name = $1, email = $2, password_hash = $3, updated_at = now()
            WHERE id = $4
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
