//! HTTP 请求处理器模块
//!
//! 包含所有 REST API 端点的处理器实现

pub mod admin_receipt;
pub mod admin_review;
pub mod auth;
pub mod gallery;
pub mod health;
pub mod member;
pub mod payment;
pub mod profile;
pub mod receipt;
pub mod review;
pub mod stats;
