use axum::{
    extract::{Json, Path, Query, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        ApiResponse, EmptyResponse, PageQuery, PaginatedResponse,
        user::{CreateUserRequest, UpdateUserRequest, UserProfile},
    },
    error::AppError,
    services::{NewAccount, UserChanges},
    utils::success_to_api_response,
};

type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

pub(crate) fn user_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(e) => {
            tracing::warn!("Invalid user id in path: {}", e);
            Err(AppError::Validation("用户ID无效".into()))
        }
    }
}

pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(e) => {
            tracing::warn!("Invalid request body: {}", e);
            Err(AppError::Validation("请求体无效".into()))
        }
    }
}

/// 创建用户
pub async fn create_user(
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

/// 分页获取用户列表
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<UserProfile>> {
    let page = state
        .identity
        .get_users(query.page(), query.per_page())
        .await?;
    Ok((StatusCode::OK, success_to_api_response(page)))
}

/// 根据ID获取用户
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<UserProfile> {
    let id = user_id(path)?;
    let user = state.identity.get_user_by_id(id).await?;
    Ok((StatusCode::OK, success_to_api_response(user)))
}

/// 更新用户（需要认证）
pub async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let id = user_id(path)?;
    let req = body(payload)?;
    req.validate()?;

    let user = state
        .identity
        .update_user(
            id,
            UserChanges {
                name: req.name.map(|n| n.trim().to_string()),
                email: req.email,
            },
        )
        .await?;
    Ok((StatusCode::OK, success_to_api_response(user)))
}

/// 删除用户（需要认证）
pub async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<EmptyResponse> {
    let id = user_id(path)?;
    state.identity.delete_user(id).await?;
    Ok((StatusCode::OK, success_to_api_response(EmptyResponse {})))
}
