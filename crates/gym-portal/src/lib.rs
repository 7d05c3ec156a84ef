//! 健身房会员门户（Web 服务）
//!
//! 提供会员注册登录、收据上传、付款查询、评价提交以及后台审核与统计的 REST API，
//! 同时托管前端静态页面。
//!
//! ## 模块结构
//!
//! - `auth`: 访问令牌校验
//! - `dto`: 请求参数与统一响应结构
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `middleware`: 认证、管理员检查和安全头
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use dto::ApiResponse;
pub use error::{PortalError, Result};
pub use state::{AppState, Backends};
