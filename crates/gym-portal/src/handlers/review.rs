//! 会员评价 API 处理器

use axum::{Extension, Json, extract::State};
use membership::dto::SubmitReviewInput;
use membership::{Review, ReviewEligibility};

use crate::{auth::CurrentUser, dto::ApiResponse, error::PortalError, state::AppState};

/// 首页精选评价
///
/// GET /api/reviews/featured
pub async fn featured_reviews(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Review>>>, PortalError> {
    let reviews = state.reviews.featured_reviews().await?;
    Ok(Json(ApiResponse::success(reviews)))
}

/// 全部已审核通过的评价
///
/// GET /api/reviews/approved
pub async fn approved_reviews(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Review>>>, PortalError> {
    let reviews = state.reviews.approved_reviews().await?;
    Ok(Json(ApiResponse::success(reviews)))
}

/// 当前会员能否提交评价
///
/// GET /api/reviews/eligibility
pub async fn review_eligibility(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<ReviewEligibility>>, PortalError> {
    let eligibility = state.reviews.eligibility(user.id).await?;
    Ok(Json(ApiResponse::success(eligibility)))
}

/// 提交评价
///
/// POST /api/reviews
pub async fn submit_review(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<SubmitReviewInput>,
) -> Result<Json<ApiResponse<Review>>, PortalError> {
    let review = state.reviews.submit_review(user.id, req).await?;
    Ok(Json(ApiResponse::success_with_message(
        review,
        "感谢评价，审核通过后将展示",
    )))
}
