//! 相册 API 处理器

use axum::{Json, extract::State};
use membership::dto::GalleryImage;

use crate::{dto::ApiResponse, error::PortalError, state::AppState};

/// 相册图片列表
///
/// GET /api/gallery
pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<GalleryImage>>>, PortalError> {
    let images = state.gallery.list_images().await?;
    Ok(Json(ApiResponse::success(images)))
}
