//! 认证相关的 HTTP 处理器

use crate::{
    auth::{
        cookie::{create_auth_cookie, create_logout_cookie},
        middleware::AuthContext,
    },
    error::AppError,
    middleware::AppState,
    models::account::{
        CurrentAccountResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    },
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let account = state.account_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful".to_string(),
            user: account.into(),
        }),
    ))
}

/// 登录：令牌同时写入 Cookie 和响应体
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let outcome = state.account_service.login(req).await?;

    let security = &state.config.security;
    let cookie = create_auth_cookie(
        &security.cookie_name,
        &outcome.token,
        security.cookie_max_age_secs(),
        security.cookie_secure,
    )
    .ok_or_else(|| AppError::internal_error("Failed to build auth cookie"))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie);

    Ok((
        headers,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            token: outcome.token,
            user: outcome.account.into(),
        }),
    ))
}

/// 登出
///
/// 令牌是无状态的，服务端没有需要作废的记录，只让客户端丢弃 Cookie。
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let security = &state.config.security;
    let cookie = create_logout_cookie(&security.cookie_name, security.cookie_secure)
        .ok_or_else(|| AppError::internal_error("Failed to build logout cookie"))?;

    tracing::info!(user_id = auth_context.user_id, "User logged out");

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie);

    Ok((headers, Json(json!({"message": "Logout successful"}))))
}

/// 获取当前用户信息
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let account = state.account_service.current(auth_context.user_id).await?;

    Ok(Json(CurrentAccountResponse {
        user: account.into(),
    }))
}
