//! 后台评价审核 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};
use membership::Review;
use uuid::Uuid;

use crate::{
    dto::{ApiResponse, DeletedResponse, ReviewListQuery},
    error::PortalError,
    state::AppState,
};

/// 评价列表（可按状态过滤）
///
/// GET /api/admin/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<ApiResponse<Vec<Review>>>, PortalError> {
    let reviews = state.reviews.list_reviews(query.status).await?;
    Ok(Json(ApiResponse::success(reviews)))
}

/// 审核通过
///
/// POST /api/admin/reviews/{id}/approve
pub async fn approve_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Review>>, PortalError> {
    let review = state.reviews.approve(id).await?;
    Ok(Json(ApiResponse::success(review)))
}

/// 驳回（同时取消精选）
///
/// POST /api/admin/reviews/{id}/reject
pub async fn reject_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Review>>, PortalError> {
    let review = state.reviews.reject(id).await?;
    Ok(Json(ApiResponse::success(review)))
}

/// 设为精选
///
/// POST /api/admin/reviews/{id}/feature
pub async fn feature_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Review>>, PortalError> {
    let review = state.reviews.feature(id).await?;
    Ok(Json(ApiResponse::success(review)))
}

/// 取消精选
///
/// POST /api/admin/reviews/{id}/unfeature
pub async fn unfeature_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Review>>, PortalError> {
    let review = state.reviews.unfeature(id).await?;
    Ok(Json(ApiResponse::success(review)))
}

/// 删除评价
///
/// DELETE /api/admin/reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedResponse>>, PortalError> {
    state.reviews.delete(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse { id, deleted: true })))
}
