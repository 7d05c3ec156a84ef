//! 管理员检查中间件
//!
//! 管理员身份以会员资料中的 role 为准，而不是令牌里的声明

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use membership::dto::Actor;
use serde_json::json;
use tracing::warn;

use super::auth::unauthorized_response;
use crate::auth::CurrentUser;
use crate::error::PortalError;
use crate::state::AppState;

/// 要求当前用户为管理员
///
/// 通过后把 `Actor` 注入请求扩展，供后台处理器记录操作人
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match request.extensions().get::<CurrentUser>() {
        Some(user) => user.clone(),
        None => return unauthorized_response("未认证"),
    };

    let member = match state.accounts.get_profile(user.id).await {
        Ok(member) => member,
        Err(membership::MembershipError::MemberNotFound(_)) => {
            return forbidden_response("会员资料不存在");
        }
        Err(e) => return PortalError::from(e).into_response(),
    };

    if !member.is_admin() {
        warn!(user_id = %user.id, path = %request.uri().path(), "非管理员访问后台接口");
        return forbidden_response("需要管理员权限");
    }

    request.extensions_mut().insert(Actor::admin(member.id));
    next.run(request).await
}

/// 生成 403 禁止访问响应
fn forbidden_response(message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": "FORBIDDEN",
        "message": message,
        "data": null
    });

    (StatusCode::FORBIDDEN, axum::Json(body)).into_response()
}
