//! 会员服务
//!
//! 健身房会员门户的业务核心：会员资料、缴费收据审核、付款台账、评价审核与后台统计。
//!
//! ## 核心功能
//!
//! - **账号**：注册与登录委托托管认证服务，会员资料保存在 `users` 表
//! - **收据**：会员上传缴费凭证，管理员审核通过后生成付款记录
//! - **评价**：会员每 3 个月可提交一次评价，管理员审核并精选（最多 10 条）
//! - **统计**：月度收入、欠费会员、待停用会员等聚合由数据库存储过程完成
//!
//! ## 模块结构
//!
//! - `models`: 领域模型与纯函数规则
//! - `error`: 错误类型定义
//! - `repository`: 数据库仓储层
//! - `service`: 业务服务层
//! - `test_utils`: 内存仓储等测试替身（`test-utils` feature）

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{MembershipError, Result};
pub use models::*;
pub use repository::{
    MemberRepository, PaymentRepository, ReceiptRepository, ReviewRepository, StatsRepository,
};
pub use service::{
    AccountService, DashboardService, GalleryService, MemberService, PaymentService,
    ReceiptService, ReviewService, dto,
};
