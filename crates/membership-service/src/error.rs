//! 会员服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use chrono::{DateTime, Utc};
use gym_shared::error::GymError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Review;

/// 会员服务错误类型
#[derive(Debug, Error)]
pub enum MembershipError {
    // === 会员相关错误 ===
    #[error("会员不存在: {0}")]
    MemberNotFound(Uuid),

    #[error("邮箱或密码错误")]
    InvalidCredentials(String),

    #[error("无权执行此操作: {0}")]
    Forbidden(String),

    // === 收据相关错误 ===
    #[error("收据不存在: {0}")]
    ReceiptNotFound(Uuid),

    #[error("收据状态不允许此操作: receipt_id={receipt_id}, current_status={current_status}")]
    InvalidReceiptStatus {
        receipt_id: Uuid,
        current_status: String,
    },

    // === 评价相关错误 ===
    #[error("评价不存在: {0}")]
    ReviewNotFound(Uuid),

    #[error("评价状态不允许此操作: review_id={review_id}, current_status={current_status}")]
    InvalidReviewStatus {
        review_id: Uuid,
        current_status: String,
    },

    #[error("每 3 个月只能提交一次评价，下次可提交时间: {next_eligible_at}")]
    ReviewTooSoon { next_eligible_at: DateTime<Utc> },

    #[error("精选评价已达上限 {limit} 条，请先取消一条精选")]
    FeaturedLimitReached { limit: usize, featured: Vec<Review> },

    // === 系统错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("托管服务错误: {0}")]
    Backend(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 会员服务 Result 类型别名
pub type Result<T> = std::result::Result<T, MembershipError>;

impl MembershipError {
    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Backend(_) | Self::Internal(_)
        )
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::ReceiptNotFound(_) => "RECEIPT_NOT_FOUND",
            Self::InvalidReceiptStatus { .. } => "INVALID_RECEIPT_STATUS",
            Self::ReviewNotFound(_) => "REVIEW_NOT_FOUND",
            Self::InvalidReviewStatus { .. } => "INVALID_REVIEW_STATUS",
            Self::ReviewTooSoon { .. } => "REVIEW_TOO_SOON",
            Self::FeaturedLimitReached { .. } => "FEATURED_LIMIT_REACHED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Backend(_) => "BACKEND_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<GymError> for MembershipError {
    fn from(err: GymError) -> Self {
        match err {
            GymError::Database(e) => Self::Database(e),
            GymError::Unauthorized(msg) => Self::InvalidCredentials(msg),
            GymError::Http(e) => Self::Backend(e.to_string()),
            GymError::Backend { status, message } => {
                Self::Backend(format!("status={}, {}", status, message))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for MembershipError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
