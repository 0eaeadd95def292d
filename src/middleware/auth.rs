use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use crate::{AppState, error::AppError};

/// 校验 Bearer 令牌，并把 `Claims` 放进请求扩展
///
/// 只校验签名与有效期；登出后的令牌在过期前仍可通过。
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|rejection| {
        if rejection.is_missing() {
            AppError::Unauthorized("缺少 Authorization 请求头")
        } else {
            AppError::Unauthorized("需要 Bearer 令牌")
        }
    })?;

    let claims = state.identity.authenticate(bearer.token())?;
    tracing::debug!("Authenticated user {}", claims.user_id);

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
