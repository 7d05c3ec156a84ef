//! JWT 认证中间件
//!
//! 验证请求中的 Bearer Token 并将当前用户注入请求扩展

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::state::AppState;

/// 无需登录即可访问的 API
const PUBLIC_API_PATHS: &[&str] = &[
    "/api/auth/signup",
    "/api/auth/signin",
    "/api/auth/refresh",
    "/api/reviews/featured",
    "/api/reviews/approved",
    "/api/gallery",
];

/// 是否为公开路径
///
/// `/api` 以外的路径（页面静态资源、探针）全部公开
pub fn is_public_path(path: &str) -> bool {
    if path != "/api" && !path.starts_with("/api/") {
        return true;
    }
    PUBLIC_API_PATHS.contains(&path.trim_end_matches('/'))
}

/// 认证中间件
///
/// 从 Authorization header 中提取 Bearer Token，验证后将 `CurrentUser` 注入请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let token = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => return unauthorized_response("缺少认证 Token"),
    };

    match state.jwt.authenticate(&token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => unauthorized_response(&e.to_string()),
    }
}

/// 生成 401 未授权响应
pub(super) fn unauthorized_response(message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": "UNAUTHORIZED",
        "message": message,
        "data": null
    });

    (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}
