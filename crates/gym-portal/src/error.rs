//! 门户 HTTP 层错误类型定义
//!
//! 把服务层错误映射为 HTTP 状态码和统一的 JSON 错误响应

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use membership::{MembershipError, Review};
use serde_json::json;
use uuid::Uuid;

/// 门户错误类型
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),
    #[error("邮箱或密码错误")]
    InvalidCredentials,

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),
    #[error("上传内容过大: {0}")]
    PayloadTooLarge(String),

    // 资源不存在
    #[error("会员不存在: {0}")]
    MemberNotFound(Uuid),
    #[error("收据不存在: {0}")]
    ReceiptNotFound(Uuid),
    #[error("评价不存在: {0}")]
    ReviewNotFound(Uuid),
    #[error("资源不存在: {0}")]
    NotFound(String),

    // 业务错误
    #[error("收据状态不允许此操作: {0}")]
    InvalidReceiptStatus(String),
    #[error("评价状态不允许此操作: {0}")]
    InvalidReviewStatus(String),
    #[error("每 3 个月只能提交一次评价，下次可提交时间: {next_eligible_at}")]
    ReviewTooSoon { next_eligible_at: DateTime<Utc> },
    #[error("精选评价已达上限 {limit} 条，请先取消一条精选")]
    FeaturedLimitReached { limit: usize, featured: Vec<Review> },

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("托管服务错误: {0}")]
    Backend(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl PortalError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,

            Self::MemberNotFound(_)
            | Self::ReceiptNotFound(_)
            | Self::ReviewNotFound(_)
            | Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::InvalidReceiptStatus(_)
            | Self::InvalidReviewStatus(_)
            | Self::ReviewTooSoon { .. }
            | Self::FeaturedLimitReached { .. } => StatusCode::CONFLICT,

            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::ReceiptNotFound(_) => "RECEIPT_NOT_FOUND",
            Self::ReviewNotFound(_) => "REVIEW_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidReceiptStatus(_) => "INVALID_RECEIPT_STATUS",
            Self::InvalidReviewStatus(_) => "INVALID_REVIEW_STATUS",
            Self::ReviewTooSoon { .. } => "REVIEW_TOO_SOON",
            Self::FeaturedLimitReached { .. } => "FEATURED_LIMIT_REACHED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Backend(_) => "BACKEND_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 部分业务错误需要在 data 中附带上下文，前端据此给出下一步操作
    fn detail(&self) -> serde_json::Value {
        match self {
            Self::ReviewTooSoon { next_eligible_at } => json!({
                "nextEligibleAt": next_eligible_at,
            }),
            Self::FeaturedLimitReached { limit, featured } => json!({
                "limit": limit,
                "featured": featured,
            }),
            _ => serde_json::Value::Null,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Backend(e) => {
                tracing::error!(error = %e, "托管服务调用失败");
                "服务暂时不可用，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": self.detail()
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for PortalError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从会员服务错误转换
impl From<MembershipError> for PortalError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::MemberNotFound(id) => Self::MemberNotFound(id),
            MembershipError::InvalidCredentials(_) => Self::InvalidCredentials,
            MembershipError::Forbidden(msg) => Self::Forbidden(msg),
            MembershipError::ReceiptNotFound(id) => Self::ReceiptNotFound(id),
            MembershipError::InvalidReceiptStatus {
                receipt_id,
                current_status,
            } => Self::InvalidReceiptStatus(format!(
                "receipt_id={}, current_status={}",
                receipt_id, current_status
            )),
            MembershipError::ReviewNotFound(id) => Self::ReviewNotFound(id),
            MembershipError::InvalidReviewStatus {
                review_id,
                current_status,
            } => Self::InvalidReviewStatus(format!(
                "review_id={}, current_status={}",
                review_id, current_status
            )),
            MembershipError::ReviewTooSoon { next_eligible_at } => {
                Self::ReviewTooSoon { next_eligible_at }
            }
            MembershipError::FeaturedLimitReached { limit, featured } => {
                Self::FeaturedLimitReached { limit, featured }
            }
            MembershipError::Validation(msg) => Self::Validation(msg),
            MembershipError::Database(e) => Self::Database(e),
            MembershipError::Backend(msg) => Self::Backend(msg),
            MembershipError::Internal(msg) => Self::Internal(msg),
        }
    }
}

/// 门户 Result 类型别名
pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ---- 辅助函数 ----

    /// 所有错误变体及其期望的 (StatusCode, error_code)
    fn all_error_variants() -> Vec<(PortalError, StatusCode, &'static str)> {
        vec![
            (PortalError::Unauthorized("token expired".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (PortalError::Forbidden("admin only".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (PortalError::InvalidCredentials, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            (PortalError::Validation("amount".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (PortalError::PayloadTooLarge("6 MB".into()), StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            (PortalError::MemberNotFound(Uuid::nil()), StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND"),
            (PortalError::ReceiptNotFound(Uuid::nil()), StatusCode::NOT_FOUND, "RECEIPT_NOT_FOUND"),
            (PortalError::ReviewNotFound(Uuid::nil()), StatusCode::NOT_FOUND, "REVIEW_NOT_FOUND"),
            (PortalError::NotFound("page".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (PortalError::InvalidReceiptStatus("verified".into()), StatusCode::CONFLICT, "INVALID_RECEIPT_STATUS"),
            (PortalError::InvalidReviewStatus("pending".into()), StatusCode::CONFLICT, "INVALID_REVIEW_STATUS"),
            (PortalError::ReviewTooSoon { next_eligible_at: Utc::now() }, StatusCode::CONFLICT, "REVIEW_TOO_SOON"),
            (PortalError::FeaturedLimitReached { limit: 10, featured: vec![] }, StatusCode::CONFLICT, "FEATURED_LIMIT_REACHED"),
            (PortalError::Backend("status=503".into()), StatusCode::BAD_GATEWAY, "BACKEND_ERROR"),
            (PortalError::Internal("unexpected state".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ]
    }

    #[test]
    fn test_all_variants_status_code() {
        for (error, expected_status, label) in all_error_variants() {
            assert_eq!(
                error.status_code(),
                expected_status,
                "状态码不匹配: variant={label}"
            );
        }
    }

    #[test]
    fn test_all_variants_error_code() {
        for (error, _status, expected_code) in all_error_variants() {
            assert_eq!(
                error.error_code(),
                expected_code,
                "错误码不匹配: expected={expected_code}"
            );
        }
    }

    #[test]
    fn test_display_contains_context() {
        let id = Uuid::new_v4();
        assert!(PortalError::ReceiptNotFound(id).to_string().contains(&id.to_string()));
        assert!(PortalError::Validation("金额".into()).to_string().contains("金额"));
        assert!(
            PortalError::FeaturedLimitReached { limit: 10, featured: vec![] }
                .to_string()
                .contains("10")
        );
    }

    #[test]
    fn test_from_membership_error() {
        let id = Uuid::new_v4();
        let err: PortalError = MembershipError::ReceiptNotFound(id).into();
        assert!(matches!(err, PortalError::ReceiptNotFound(x) if x == id));

        let err: PortalError = MembershipError::InvalidCredentials("bad".into()).into();
        assert!(matches!(err, PortalError::InvalidCredentials));

        let err: PortalError = MembershipError::InvalidReceiptStatus {
            receipt_id: id,
            current_status: "verified".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("verified"));

        let err: PortalError = MembershipError::Backend("status=500, oops".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    /// 响应体必须包含 success/code/message/data 四个字段
    #[tokio::test]
    async fn test_into_response_body_structure() {
        for (error, expected_status, expected_code) in all_error_variants() {
            let label = format!("{:?}", error);
            let response = error.into_response();
            assert_eq!(response.status(), expected_status, "响应状态码不匹配: {label}");

            let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("读取响应体失败");
            let body: serde_json::Value =
                serde_json::from_slice(&body_bytes).expect("响应体不是合法 JSON");

            assert_eq!(body["success"], json!(false), "success 字段应为 false: {label}");
            assert_eq!(body["code"], json!(expected_code), "code 字段不匹配: {label}");
            assert!(!body["message"].as_str().unwrap_or("").is_empty(), "message 不应为空: {label}");
            assert!(body.get("data").is_some(), "缺少 data 字段: {label}");
        }
    }

    #[tokio::test]
    async fn test_featured_limit_carries_featured_list() {
        let response = PortalError::FeaturedLimitReached {
            limit: 10,
            featured: vec![],
        }
        .into_response();

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["data"]["limit"], json!(10));
        assert!(body["data"]["featured"].is_array());
    }

    /// 系统级错误的响应消息不应泄露内部细节
    #[tokio::test]
    async fn test_system_errors_hide_internal_details() {
        let system_errors: Vec<(PortalError, &str)> = vec![
            (PortalError::Internal("stack overflow at module X".into()), "stack overflow"),
            (PortalError::Backend("status=500, https://xyz.example.co".into()), "xyz.example.co"),
            (PortalError::Database(sqlx::Error::PoolTimedOut), "pool"),
        ];

        for (error, secret) in system_errors {
            let response = error.into_response();
            let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
            let message = body["message"].as_str().unwrap();
            assert!(!message.contains(secret), "系统错误泄露了内部细节: {message}");
        }
    }
}
