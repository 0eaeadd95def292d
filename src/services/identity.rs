use std::sync::Arc;
use std::time::Duration;

use crate::api::models::common::PaginatedResponse;
use crate::api::models::user::{LoginResponse, UserProfile};
use crate::auth::{Claims, TokenIssuer};
use crate::cache::{CacheStore, SessionCacheOperations, UserCacheOperations};
use crate::database::{NewUser, UserEntity, UserRepository};
use crate::error::IdentityError;
use crate::utils::{PasswordCodec, normalize_page, token_fingerprint, total_pages};

/// 用户缓存默认 30 分钟
pub const DEFAULT_USER_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
/// 会话登记默认 24 小时
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 3600);

/// 创建用户所需字段
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// 部分更新；None 或空字符串表示不修改
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// 身份服务：以存储为准，缓存只做加速
///
/// 读路径和写路径上的缓存失败只记日志，不影响请求结果；
/// 唯一例外是 `logout`，它的全部效果就是删除会话登记。
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheStore>,
    tokens: Arc<dyn TokenIssuer>,
    codec: PasswordCodec,
    user_ttl: Duration,
    session_ttl: Duration,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        cache: Arc<dyn CacheStore>,
        tokens: Arc<dyn TokenIssuer>,
        codec: PasswordCodec,
    ) -> Self {
        Self {
            users,
            cache,
            tokens,
            codec,
            user_ttl: DEFAULT_USER_CACHE_TTL,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_cache_ttls(mut self, user_ttl: Duration, session_ttl: Duration) -> Self {
        self.user_ttl = user_ttl;
        self.session_ttl = session_ttl;
        self
    }

    pub async fn create_user(&self, account: NewAccount) -> Result<UserProfile, IdentityError> {
        tracing::info!("Creating user {}", account.email);

        // 预检只是优化，唯一约束以存储层为准
        if self.users.find_by_email(&account.email).await?.is_some() {
            tracing::warn!("Email already registered: {}", account.email);
            return Err(IdentityError::DuplicateEmail);
        }

        let password_hash = self.hash_password(account.password).await?;
        let user = self
            .users
            .create(NewUser {
                name: account.name,
                email: account.email,
                password_hash,
            })
            .await
            .inspect_err(|e| tracing::warn!("User insert rejected: {}", e))?;

        let profile = UserProfile::from(&user);
        self.refresh_cached_user(&profile).await;

        tracing::info!("Created user {}", user.id);
        Ok(profile)
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<UserProfile, IdentityError> {
        match UserCacheOperations::get_cached_user(self.cache.as_ref(), id).await {
            Ok(Some(profile)) => {
                tracing::debug!("User cache hit: {}", id);
                return Ok(profile);
            }
            Ok(None) => tracing::debug!("User cache miss: {}", id),
            Err(e) => tracing::warn!("User cache read failed for {}: {}", id, e),
        }

        let user = self.find_user(id).await?;
        let profile = UserProfile::from(&user);
        self.refresh_cached_user(&profile).await;
        Ok(profile)
    }

    /// 列表查询不走缓存
    pub async fn get_users(
        &self,
        page: i64,
        per_page: i64,
    ) -> Result<PaginatedResponse<UserProfile>, IdentityError> {
        let (page, per_page, offset) = normalize_page(page, per_page);
        let (users, total) = self.users.list(offset, per_page).await?;

        let items: Vec<UserProfile> = users.iter().map(UserProfile::from).collect();
        tracing::debug!(
            "Listed {} of {} users (page {}, per_page {})",
            items.len(),
            total,
            page,
            per_page
        );

        Ok(PaginatedResponse {
            items,
            page,
            per_page,
            total,
            total_pages: total_pages(total, per_page),
        })
    }

    pub async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<UserProfile, IdentityError> {
        let mut user = self.find_user(id).await?;

        if let Some(name) = changes.name.filter(|n| !n.is_empty()) {
            user.name = name;
        }
        if let Some(email) = changes.email.filter(|e| !e.is_empty()) {
            user.email = email;
        }

        let user = self.users.update(&user).await?;
        let profile = UserProfile::from(&user);
        self.refresh_cached_user(&profile).await;

        tracing::info!("Updated user {}", id);
        Ok(profile)
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), IdentityError> {
        // 先确认存在，避免删除不存在的用户也返回成功
        self.find_user(id).await?;
        self.users.delete(id).await?;

        if let Err(e) = UserCacheOperations::remove_user_from_cache(self.cache.as_ref(), id).await {
            tracing::warn!("Failed to evict user {} from cache: {}", id, e);
        }

        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, IdentityError> {
        // 账号不存在与密码错误返回同一个错误
        let Some(user) = self.users.find_by_email(email).await? else {
            tracing::warn!("Login for unknown email {}", email);
            return Err(IdentityError::InvalidCredentials);
        };

        if !self.verify_password(&user, password).await? {
            tracing::warn!("Password mismatch for user {}", user.id);
            return Err(IdentityError::InvalidCredentials);
        }

        let issued = self
            .tokens
            .issue(user.id)
            .map_err(|e| IdentityError::Internal(e.to_string()))?;

        // 会话登记只是提前失效的手段，令牌本身靠签名校验
        if let Err(e) = SessionCacheOperations::cache_session(
            self.cache.as_ref(),
            user.id,
            &issued.token,
            self.session_ttl,
        )
        .await
        {
            tracing::warn!("Failed to register session for user {}: {}", user.id, e);
        }

        tracing::info!(
            "User {} logged in (token {})",
            user.id,
            token_fingerprint(&issued.token)
        );
        Ok(LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user: UserProfile::from(&user),
        })
    }

    /// 只删除会话登记，已签发的令牌在过期前依然有效
    pub async fn logout(&self, user_id: i64) -> Result<(), IdentityError> {
        let existed = SessionCacheOperations::remove_session(self.cache.as_ref(), user_id)
            .await
            .inspect_err(|e| tracing::error!("Logout failed for user {}: {}", user_id, e))?;

        tracing::info!("User {} logged out (session registered: {})", user_id, existed);
        Ok(())
    }

    /// 校验令牌签名与有效期，不查询会话登记
    pub fn authenticate(&self, token: &str) -> Result<Claims, IdentityError> {
        Ok(self.tokens.validate(token)?)
    }

    /// 会话登记是否存在；缓存不可用时按不存在处理
    pub async fn session_active(&self, user_id: i64) -> bool {
        match SessionCacheOperations::session_exists(self.cache.as_ref(), user_id).await {
            Ok(active) => active,
            Err(e) => {
                tracing::warn!("Session lookup failed for user {}: {}", user_id, e);
                false
            }
        }
    }

    async fn find_user(&self, id: i64) -> Result<UserEntity, IdentityError> {
        self.users.find_by_id(id).await?.ok_or_else(|| {
            tracing::warn!("User not found: {}", id);
            IdentityError::NotFound
        })
    }

    async fn refresh_cached_user(&self, profile: &UserProfile) {
        if let Err(e) =
            UserCacheOperations::cache_user(self.cache.as_ref(), profile, self.user_ttl).await
        {
            tracing::warn!("Failed to cache user {}: {}", profile.id, e);
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, IdentityError> {
        let codec = self.codec;
        tokio::task::spawn_blocking(move || codec.hash(&password))
            .await
            .map_err(|e| IdentityError::Internal(format!("hash task failed: {}", e)))?
    }

    async fn verify_password(&self, user: &UserEntity, password: &str) -> Result<bool, IdentityError> {
        let codec = self.codec;
        let digest = user.password_hash.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || codec.verify(&digest, &password))
            .await
            .map_err(|e| IdentityError::Internal(format!("verify task failed: {}", e)))
    }
}
