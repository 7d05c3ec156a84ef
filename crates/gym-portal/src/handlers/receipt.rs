//! 会员收据 API 处理器
//!
//! 上传收据使用 multipart 表单：`file`、`amount`、`description`

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};
use membership::dto::{Actor, DeleteReceiptResult, UploadReceiptInput};
use membership::{MonthlyReceipts, Receipt};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    dto::{ApiResponse, ReceiptFileUrl},
    error::PortalError,
    state::AppState,
};

/// 上传表单解析后的内容
#[derive(Debug, Default)]
struct ReceiptForm {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
    amount: Option<String>,
    description: Option<String>,
}

fn multipart_error(err: MultipartError) -> PortalError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PortalError::PayloadTooLarge(err.body_text())
    } else {
        PortalError::Validation(format!("上传表单解析失败: {}", err.body_text()))
    }
}

async fn read_form(mut multipart: Multipart) -> Result<ReceiptForm, PortalError> {
    let mut form = ReceiptForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(str::to_string);
                form.content_type = field.content_type().map(str::to_string);
                form.bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
            }
            "amount" => form.amount = Some(field.text().await.map_err(multipart_error)?),
            "description" => {
                let text = field.text().await.map_err(multipart_error)?;
                let text = text.trim();
                if !text.is_empty() {
                    form.description = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// 解析金额，允许千分位逗号
fn parse_amount(raw: Option<&str>) -> Result<f64, PortalError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PortalError::Validation("请填写金额".to_string()))?;

    raw.replace(',', "")
        .parse::<f64>()
        .map_err(|_| PortalError::Validation(format!("金额格式不正确: {}", raw)))
}

/// 上传收据
///
/// POST /api/receipts
pub async fn upload_receipt(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Receipt>>, PortalError> {
    let form = read_form(multipart).await?;
    let amount = parse_amount(form.amount.as_deref())?;

    let receipt = state
        .receipts
        .upload_receipt(UploadReceiptInput {
            user_id: user.id,
            file_name: form.file_name.unwrap_or_else(|| "receipt".to_string()),
            content_type: form
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            bytes: form.bytes,
            amount,
            description: form.description,
        })
        .await?;

    info!(receipt_id = %receipt.id, user_id = %user.id, "收据已上传");
    Ok(Json(ApiResponse::success_with_message(
        receipt,
        "收据已提交，等待审核",
    )))
}

/// 我的收据
///
/// GET /api/receipts
pub async fn list_my_receipts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Receipt>>>, PortalError> {
    let receipts = state.receipts.list_user_receipts(user.id).await?;
    Ok(Json(ApiResponse::success(receipts)))
}

/// 我的收据（按月分组）
///
/// GET /api/receipts/by-month
pub async fn list_my_receipts_by_month(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<MonthlyReceipts>>>, PortalError> {
    let groups = state.receipts.list_user_receipts_by_month(user.id).await?;
    Ok(Json(ApiResponse::success(groups)))
}

/// 收据文件临时链接
///
/// GET /api/receipts/{id}/file
pub async fn get_receipt_file(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReceiptFileUrl>>, PortalError> {
    let url = state
        .receipts
        .receipt_file_url(id, Actor::member(user.id))
        .await?;

    Ok(Json(ApiResponse::success(ReceiptFileUrl {
        receipt_id: id,
        url,
        expires_in_seconds: state.receipts.settings().signed_url_ttl_seconds,
    })))
}

/// 删除自己的收据（已审核通过的不可删除）
///
/// DELETE /api/receipts/{id}
pub async fn delete_my_receipt(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteReceiptResult>>, PortalError> {
    let result = state
        .receipts
        .delete_receipt(id, Actor::member(user.id))
        .await?;
    Ok(Json(ApiResponse::success(result)))
}
