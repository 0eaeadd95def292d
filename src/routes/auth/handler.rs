use axum::{
    extract::{Extension, Json, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        ApiResponse, EmptyResponse,
        user::{CreateUserRequest, LoginRequest, LoginResponse, MeResponse, UserProfile},
    },
    auth::Claims,
    error::AppError,
    routes::user::handler::body,
    services::NewAccount,
    utils::success_to_api_response,
};

type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

/// 注册新用户
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let req = body(payload)?;
    req.validate()?;

    let user = state
        .identity
        .create_user(NewAccount {
            name: req.name.trim().to_string(),
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, success_to_api_response(user)))
}

/// 用户登录
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let req = body(payload)?;
    req.validate()?;

    let resp = state.identity.login(&req.email, &req.password).await?;
    Ok((StatusCode::OK, success_to_api_response(resp)))
}

/// 登出，删除会话登记
pub async fn logout(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> ApiResult<EmptyResponse> {
    state.identity.logout(claims.user_id).await?;
    Ok((StatusCode::OK, success_to_api_response(EmptyResponse {})))
}

/// 当前登录用户信息
pub async fn me(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> ApiResult<MeResponse> {
    let user = state.identity.get_user_by_id(claims.user_id).await?;
    let session_active = state.identity.session_active(claims.user_id).await;
    Ok((
        StatusCode::OK,
        success_to_api_response(MeResponse {
            user,
            session_active,
        }),
    ))
}
