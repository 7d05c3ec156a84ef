//! 共享库
//!
//! 包含所有服务共用的配置、错误处理、数据库连接、可观测性，以及托管认证与对象存储客户端。

pub mod auth_client;
pub mod config;
pub mod database;
pub mod error;
pub mod observability;
pub mod storage;
