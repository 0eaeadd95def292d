use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// 令牌校验失败的原因；调用方统一视为认证失败
#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    #[error("token invalid")]
    Invalid,
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// 校验通过的令牌内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: i64) -> Result<IssuedToken, TokenError>;
    fn validate(&self, token: &str) -> Result<Claims, TokenError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String, // 用户ID
    iat: i64,    // 签发时间
    exp: i64,    // 过期时间
}

/// HS256 JWT 签发器，密钥在构造时注入
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user_id: i64) -> Result<IssuedToken, TokenError> {
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<JwtClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => TokenError::Malformed,
                _ => TokenError::Invalid,
            }
        })?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed)?;

        Ok(Claims {
            user_id,
            issued_at: data.claims.iat,
            expires_at: data.claims.exp,
        })
    }
}
