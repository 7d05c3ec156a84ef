//! 后台收据审核 API 处理器

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
};
use membership::Receipt;
use membership::dto::{
    Actor, CleanupInput, CleanupReport, DeleteReceiptResult, RejectReceiptInput,
    VerifyReceiptResult,
};
use serde::de::DeserializeOwned;
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{ApiResponse, ReceiptFileUrl, ReceiptListQuery},
    error::PortalError,
    state::AppState,
};

/// 解析可省略的 JSON 请求体，空体使用默认值
fn optional_body<T>(body: &Bytes) -> Result<T, PortalError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| PortalError::Validation(format!("请求体格式错误: {}", e)))
}

/// 收据列表（可按状态过滤）
///
/// GET /api/admin/receipts
pub async fn list_receipts(
    State(state): State<AppState>,
    Query(query): Query<ReceiptListQuery>,
) -> Result<Json<ApiResponse<Vec<Receipt>>>, PortalError> {
    let receipts = state.receipts.list_receipts(query.status).await?;
    Ok(Json(ApiResponse::success(receipts)))
}

/// 审核通过
///
/// POST /api/admin/receipts/{id}/approve
pub async fn approve_receipt(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VerifyReceiptResult>>, PortalError> {
    let result = state.receipts.verify_receipt(id, actor.id).await?;
    info!(receipt_id = %id, admin_id = %actor.id, "收据审核通过");
    Ok(Json(ApiResponse::success(result)))
}

/// 驳回
///
/// POST /api/admin/receipts/{id}/reject
pub async fn reject_receipt(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ApiResponse<Receipt>>, PortalError> {
    let input: RejectReceiptInput = optional_body(&body)?;
    let receipt = state.receipts.reject_receipt(id, actor.id, input).await?;
    info!(receipt_id = %id, admin_id = %actor.id, "收据已驳回");
    Ok(Json(ApiResponse::success(receipt)))
}

/// 收据文件临时链接
///
/// GET /api/admin/receipts/{id}/file
pub async fn get_receipt_file(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReceiptFileUrl>>, PortalError> {
    let url = state.receipts.receipt_file_url(id, actor).await?;
    Ok(Json(ApiResponse::success(ReceiptFileUrl {
        receipt_id: id,
        url,
        expires_in_seconds: state.receipts.settings().signed_url_ttl_seconds,
    })))
}

/// 删除收据（连同付款记录和文件）
///
/// DELETE /api/admin/receipts/{id}
pub async fn delete_receipt(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteReceiptResult>>, PortalError> {
    let result = state.receipts.delete_receipt(id, actor).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// 清理过期的已驳回收据
///
/// POST /api/admin/receipts/cleanup
pub async fn cleanup_receipts(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<CleanupReport>>, PortalError> {
    let input: CleanupInput = optional_body(&body)?;
    let report = state.receipts.cleanup_old_receipts(input).await?;
    Ok(Json(ApiResponse::success(report)))
}
