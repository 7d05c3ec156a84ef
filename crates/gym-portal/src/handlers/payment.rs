//! 付款台账 API 处理器

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use membership::{Payment, PaymentSummary};

use crate::{
    auth::CurrentUser,
    dto::{ApiResponse, PaymentListQuery},
    error::PortalError,
    state::AppState,
};

/// 我的付款记录
///
/// GET /api/payments
pub async fn list_my_payments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, PortalError> {
    let payments = state.payments.list_user_payments(user.id).await?;
    Ok(Json(ApiResponse::success(payments)))
}

/// 我的付款汇总
///
/// GET /api/payments/summary
pub async fn my_payment_summary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<PaymentSummary>>, PortalError> {
    let summary = state.payments.payment_summary(user.id).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// 全部付款记录（最近优先）
///
/// GET /api/admin/payments
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, PortalError> {
    let payments = state.payments.list_payments(query.limit).await?;
    Ok(Json(ApiResponse::success(payments)))
}
