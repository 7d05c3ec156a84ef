//! 中间件模块
//!
//! 提供令牌认证、管理员检查和安全响应头

mod admin;
mod auth;
mod security;

pub use admin::require_admin;
pub use auth::{auth_middleware, is_public_path};
pub use security::security_headers;
