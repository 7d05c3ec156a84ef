//! 认证模块
//!
//! 访问令牌由托管认证服务签发，本服务只做本地校验

mod jwt;

pub use jwt::{AuthClaims, CurrentUser, JwtConfig, JwtVerifier};
