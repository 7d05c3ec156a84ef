//! 统一错误处理模块
//!
//! 基础设施层（数据库、托管认证、对象存储、配置）共享的错误类型。

use thiserror::Error;

/// 基础设施错误类型
#[derive(Debug, Error)]
pub enum GymError {
    // ==================== 数据库错误 ====================
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("记录未找到: {entity} id={id}")]
    NotFound { entity: String, id: String },

    // ==================== 托管服务错误 ====================
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("托管服务返回错误: status={status}, {message}")]
    Backend { status: u16, message: String },

    #[error("认证失败: {0}")]
    Unauthorized(String),

    // ==================== 通用错误 ====================
    #[error("配置错误: {0}")]
    Config(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, GymError>;

impl GymError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Http(_) => "HTTP_ERROR",
            Self::Backend { .. } => "BACKEND_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<config::ConfigError> for GymError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = GymError::NotFound {
            entity: "Receipt".to_string(),
            id: "123".to_string(),
        };
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(GymError::Database(sqlx::Error::PoolTimedOut).code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_backend_error_display_carries_status() {
        let err = GymError::Backend {
            status: 409,
            message: "The resource already exists".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("409"));
        assert!(msg.contains("already exists"));
        assert_eq!(err.code(), "BACKEND_ERROR");
    }
}
