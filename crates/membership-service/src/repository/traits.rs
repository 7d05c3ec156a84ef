//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    DashboardOverview, DeactivationCandidate, Member, MembershipStatus, MonthlyRevenue, NewMember,
    NewPayment, NewReceipt, NewReview, Payment, ProfileUpdate, Receipt, ReceiptStatus, Review,
    ReviewStatus, UnpaidMember,
};

/// 会员资料仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepositoryTrait: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Member>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>>;
    async fn create(&self, member: &NewMember) -> Result<Member>;
    async fn list(&self, status: Option<MembershipStatus>) -> Result<Vec<Member>>;
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Option<Member>>;
    async fn update_membership_status(
        &self,
        id: Uuid,
        status: MembershipStatus,
    ) -> Result<Option<Member>>;
    /// 返回是否有记录被更新
    async fn set_joining_fee_paid(&self, id: Uuid, paid: bool) -> Result<bool>;
    /// 返回受影响行数
    async fn bulk_update_status(&self, ids: &[Uuid], status: MembershipStatus) -> Result<u64>;
}

/// 收据仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReceiptRepositoryTrait: Send + Sync {
    async fn create(&self, receipt: &NewReceipt) -> Result<Receipt>;
    async fn get(&self, id: Uuid) -> Result<Option<Receipt>>;
    /// 按上传时间倒序
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Receipt>>;
    async fn list(&self, status: Option<ReceiptStatus>) -> Result<Vec<Receipt>>;
    /// 仅当收据仍为 pending 时更新，否则返回 None
    async fn mark_verified(&self, id: Uuid, verified_by: Uuid) -> Result<Option<Receipt>>;
    /// 仅当收据仍为 pending 时更新，否则返回 None
    async fn mark_rejected(
        &self,
        id: Uuid,
        verified_by: Uuid,
        reason: Option<String>,
    ) -> Result<Option<Receipt>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn list_older_than(
        &self,
        status: ReceiptStatus,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Receipt>>;
}

/// 付款台账仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepositoryTrait: Send + Sync {
    async fn create(&self, payment: &NewPayment) -> Result<Payment>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Payment>>;
    async fn list(&self, limit: i64) -> Result<Vec<Payment>>;
    /// 删除收据关联的付款记录，返回删除行数
    async fn delete_by_receipt(&self, receipt_id: Uuid) -> Result<u64>;
}

/// 评价仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepositoryTrait: Send + Sync {
    async fn create(&self, review: &NewReview) -> Result<Review>;
    async fn get(&self, id: Uuid) -> Result<Option<Review>>;
    async fn latest_by_user(&self, user_id: Uuid) -> Result<Option<Review>>;
    async fn list(&self, status: Option<ReviewStatus>) -> Result<Vec<Review>>;
    async fn list_featured(&self) -> Result<Vec<Review>>;
    async fn count_featured(&self) -> Result<i64>;
    /// 非 approved 状态会同时取消精选
    async fn update_status(&self, id: Uuid, status: ReviewStatus) -> Result<Option<Review>>;
    async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Option<Review>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// 统计仓储接口
///
/// 聚合计算由数据库存储过程完成
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepositoryTrait: Send + Sync {
    async fn monthly_revenue(&self, year: i32) -> Result<Vec<MonthlyRevenue>>;
    async fn unpaid_members(&self, month: NaiveDate) -> Result<Vec<UnpaidMember>>;
    async fn deactivation_candidates(&self, months: i32) -> Result<Vec<DeactivationCandidate>>;
    async fn overview(&self, month_start: NaiveDate) -> Result<DashboardOverview>;
}
