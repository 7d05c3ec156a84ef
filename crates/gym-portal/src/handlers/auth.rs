//! 认证 API 处理器
//!
//! 注册、登录、刷新和注销都转交托管认证服务

use axum::{Extension, Json, extract::State};
use chrono::Utc;
use gym_shared::auth_client::AuthSession;
use membership::Member;
use membership::dto::{SignInInput, SignInResult, SignUpInput};
use tracing::info;
use validator::Validate;

use crate::{
    auth::CurrentUser,
    dto::{ApiResponse, RefreshRequest, SessionStatus},
    error::PortalError,
    state::AppState,
};

/// 注册
///
/// POST /api/auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpInput>,
) -> Result<Json<ApiResponse<Member>>, PortalError> {
    let member = state.accounts.sign_up(req).await?;
    Ok(Json(ApiResponse::success_with_message(
        member,
        "注册成功，请登录",
    )))
}

/// 登录
///
/// POST /api/auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInInput>,
) -> Result<Json<ApiResponse<SignInResult>>, PortalError> {
    let result = state.accounts.sign_in(req).await?;
    info!(user_id = %result.member.id, "会员登录");
    Ok(Json(ApiResponse::success(result)))
}

/// 刷新会话
///
/// POST /api/auth/refresh
pub async fn refresh_session(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, PortalError> {
    req.validate()?;
    let session = state.accounts.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::success(session)))
}

/// 注销
///
/// POST /api/auth/signout
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<()>>, PortalError> {
    state.accounts.sign_out(&user.access_token).await?;
    info!(user_id = %user.id, "会员注销");
    Ok(Json(ApiResponse::<()>::success_empty()))
}

/// 当前会话状态
///
/// GET /api/auth/session
pub async fn session_status(
    Extension(user): Extension<CurrentUser>,
) -> Json<ApiResponse<SessionStatus>> {
    let now = Utc::now();
    Json(ApiResponse::success(SessionStatus {
        user_id: user.id,
        expires_in_seconds: user.expires_in_secs(now),
        expires_at: user.expires_at,
        email: user.email,
    }))
}
