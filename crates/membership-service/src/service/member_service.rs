//! 会员管理服务（后台）

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{MembershipError, Result};
use crate::models::{DeactivationCandidate, Member, MembershipStatus};
use crate::repository::{MemberRepositoryTrait, StatsRepositoryTrait};
use crate::service::dto::{DeactivateMembersInput, DeactivateMembersResult};

/// 连续多少个月无付款视为待停用
pub const DEFAULT_DEACTIVATION_MONTHS: i32 = 3;

/// 会员管理服务
pub struct MemberService {
    members: Arc<dyn MemberRepositoryTrait>,
    stats: Arc<dyn StatsRepositoryTrait>,
}

impl MemberService {
    pub fn new(members: Arc<dyn MemberRepositoryTrait>, stats: Arc<dyn StatsRepositoryTrait>) -> Self {
        Self { members, stats }
    }

    pub async fn list_members(&self, status: Option<MembershipStatus>) -> Result<Vec<Member>> {
        self.members.list(status).await
    }

    pub async fn get_member(&self, member_id: Uuid) -> Result<Member> {
        self.members
            .get(member_id)
            .await?
            .ok_or(MembershipError::MemberNotFound(member_id))
    }

    #[instrument(skip(self))]
    pub async fn update_membership_status(
        &self,
        member_id: Uuid,
        status: MembershipStatus,
    ) -> Result<Member> {
        let member = self
            .members
            .update_membership_status(member_id, status)
            .await?
            .ok_or(MembershipError::MemberNotFound(member_id))?;

        info!(member_id = %member_id, status = %status, "会籍状态已更新");
        Ok(member)
    }

    /// 待停用会员，由数据库存储过程筛选
    #[instrument(skip(self))]
    pub async fn deactivation_candidates(
        &self,
        months: Option<i32>,
    ) -> Result<Vec<DeactivationCandidate>> {
        let months = months.unwrap_or(DEFAULT_DEACTIVATION_MONTHS);
        if !(1..=36).contains(&months) {
            return Err(MembershipError::Validation("月数须为 1-36".to_string()));
        }
        self.stats.deactivation_candidates(months).await
    }

    /// 批量停用会员
    #[instrument(skip(self, input), fields(count = input.member_ids.len()))]
    pub async fn deactivate_members(
        &self,
        input: DeactivateMembersInput,
    ) -> Result<DeactivateMembersResult> {
        input.validate()?;

        let mut ids = input.member_ids;
        ids.sort();
        ids.dedup();

        let updated = self
            .members
            .bulk_update_status(&ids, MembershipStatus::Inactive)
            .await?;

        info!(requested = ids.len(), updated, "批量停用会员");
        Ok(DeactivateMembersResult {
            requested: ids.len(),
            updated,
        })
    }
}
