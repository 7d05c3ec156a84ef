//! 会员资料 API 处理器

use axum::{Extension, Json, extract::State};
use membership::Member;
use membership::dto::UpdateProfileInput;

use crate::{auth::CurrentUser, dto::ApiResponse, error::PortalError, state::AppState};

/// 获取当前会员资料
///
/// GET /api/me
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Member>>, PortalError> {
    let member = state.accounts.get_profile(user.id).await?;
    Ok(Json(ApiResponse::success(member)))
}

/// 修改当前会员资料
///
/// PUT /api/me
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileInput>,
) -> Result<Json<ApiResponse<Member>>, PortalError> {
    let member = state.accounts.update_profile(user.id, req).await?;
    Ok(Json(ApiResponse::success(member)))
}
