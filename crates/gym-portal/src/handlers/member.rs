//! 后台会员管理 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};
use membership::dto::{DeactivateMembersInput, DeactivateMembersResult};
use membership::{DeactivationCandidate, Member};
use uuid::Uuid;

use crate::{
    dto::{ApiResponse, CandidatesQuery, MemberListQuery, UpdateMembershipStatusRequest},
    error::PortalError,
    state::AppState,
};

/// 会员列表（可按会籍状态过滤）
///
/// GET /api/admin/members
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<MemberListQuery>,
) -> Result<Json<ApiResponse<Vec<Member>>>, PortalError> {
    let members = state.members.list_members(query.status).await?;
    Ok(Json(ApiResponse::success(members)))
}

/// 会员详情
///
/// GET /api/admin/members/{id}
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Member>>, PortalError> {
    let member = state.members.get_member(id).await?;
    Ok(Json(ApiResponse::success(member)))
}

/// 修改会籍状态
///
/// PATCH /api/admin/members/{id}/status
pub async fn update_member_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMembershipStatusRequest>,
) -> Result<Json<ApiResponse<Member>>, PortalError> {
    let member = state
        .members
        .update_membership_status(id, req.status)
        .await?;
    Ok(Json(ApiResponse::success(member)))
}

/// 待停用会员（连续多月无付款）
///
/// GET /api/admin/members/deactivation-candidates
pub async fn deactivation_candidates(
    State(state): State<AppState>,
    Query(query): Query<CandidatesQuery>,
) -> Result<Json<ApiResponse<Vec<DeactivationCandidate>>>, PortalError> {
    let candidates = state.members.deactivation_candidates(query.months).await?;
    Ok(Json(ApiResponse::success(candidates)))
}

/// 批量停用会员
///
/// POST /api/admin/members/deactivate
pub async fn deactivate_members(
    State(state): State<AppState>,
    Json(req): Json<DeactivateMembersInput>,
) -> Result<Json<ApiResponse<DeactivateMembersResult>>, PortalError> {
    let result = state.members.deactivate_members(req).await?;
    Ok(Json(ApiResponse::success(result)))
}
