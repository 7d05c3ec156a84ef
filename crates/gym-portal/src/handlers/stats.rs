//! 后台统计 API 处理器

use axum::{
    Json,
    extract::{Query, State},
};
use membership::{DashboardOverview, UnpaidMember, YearlyRevenue};

use crate::{
    dto::{ApiResponse, RevenueQuery, UnpaidQuery},
    error::PortalError,
    state::AppState,
};

/// 总览
///
/// GET /api/admin/stats/overview
pub async fn get_overview(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardOverview>>, PortalError> {
    let overview = state.dashboard.overview().await?;
    Ok(Json(ApiResponse::success(overview)))
}

/// 年度月收入
///
/// GET /api/admin/stats/revenue?year=2024
pub async fn get_revenue(
    State(state): State<AppState>,
    Query(query): Query<RevenueQuery>,
) -> Result<Json<ApiResponse<YearlyRevenue>>, PortalError> {
    let revenue = state.dashboard.monthly_revenue(query.year).await?;
    Ok(Json(ApiResponse::success(revenue)))
}

/// 指定月份未缴费会员
///
/// GET /api/admin/stats/unpaid?month=2024-05
pub async fn get_unpaid_members(
    State(state): State<AppState>,
    Query(query): Query<UnpaidQuery>,
) -> Result<Json<ApiResponse<Vec<UnpaidMember>>>, PortalError> {
    let members = state
        .dashboard
        .unpaid_members(query.month.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(members)))
}
