#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use identity_backend::{
    AppState,
    auth::{Claims, IssuedToken, JwtTokenIssuer, TokenError, TokenIssuer},
    cache::InMemoryCacheStore,
    config::Config,
    database::InMemoryUserRepository,
    services::{IdentityService, NewAccount},
    utils::PasswordCodec,
};

pub const SECRET: &[u8] = b"test-secret";
pub const DAY: Duration = Duration::from_secs(24 * 3600);

pub struct Harness {
    pub service: Arc<IdentityService>,
    pub users: Arc<InMemoryUserRepository>,
    pub cache: Arc<InMemoryCacheStore>,
    pub tokens: Arc<JwtTokenIssuer>,
}

pub fn harness() -> Harness {
    let tokens = Arc::new(JwtTokenIssuer::new(SECRET, DAY));
    harness_with_issuer(tokens.clone(), tokens)
}

pub fn harness_with_issuer(issuer: Arc<dyn TokenIssuer>, tokens: Arc<JwtTokenIssuer>) -> Harness {
    let users = Arc::new(InMemoryUserRepository::new());
    let cache = Arc::new(InMemoryCacheStore::new());
    let service = IdentityService::new(users.clone(), cache.clone(), issuer, PasswordCodec::new(4));

    Harness {
        service: Arc::new(service),
        users,
        cache,
        tokens,
    }
}

pub fn account(name: &str, email: &str, password: &str) -> NewAccount {
    NewAccount {
        name: name.into(),
        email: email.into(),
        password: password.into(),
    }
}

/// 签发失败的令牌签发器
pub struct FailingTokenIssuer;

impl TokenIssuer for FailingTokenIssuer {
    fn issue(&self, _user_id: i64) -> Result<IssuedToken, TokenError> {
        Err(TokenError::Signing("signing key unavailable".into()))
    }

    fn validate(&self, _token: &str) -> Result<Claims, TokenError> {
        Err(TokenError::Invalid)
    }
}

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("DATABASE_URL", "postgres://localhost/identity_test"),
        ("REDIS_URL", "redis://127.0.0.1/"),
        ("JWT_SECRET", "test-secret"),
        ("BCRYPT_COST", "4"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

pub fn app_state(h: &Harness, config: Config) -> AppState {
    AppState {
        identity: h.service.clone(),
        cache: h.cache.clone(),
        config: Arc::new(config),
    }
}
