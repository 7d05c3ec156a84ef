//! 会员资料仓储

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::MemberRepositoryTrait;
use crate::error::Result;
use crate::models::{Member, MembershipStatus, NewMember, ProfileUpdate};

const MEMBER_COLUMNS: &str = "id, email, full_name, phone, role::varchar AS role, \
                              membership_status::varchar AS membership_status, \
                              joining_fee_paid, created_at, updated_at";

/// 会员资料仓储（`users` 表）
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            MEMBER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// 新会员默认角色 member、状态 pending、入会费未缴
    async fn create(&self, member: &NewMember) -> Result<Member> {
        let created = sqlx::query_as::<_, Member>(&format!(
            r#"
            INSERT INTO users (id, email, full_name, phone, role, membership_status,
                               joining_fee_paid, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'member', 'pending', false, NOW(), NOW())
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(member.id)
        .bind(&member.email)
        .bind(&member.full_name)
        .bind(&member.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list(&self, status: Option<MembershipStatus>) -> Result<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE ($1::varchar IS NULL OR membership_status = $1)
            ORDER BY created_at DESC
            "#,
            MEMBER_COLUMNS
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(&format!(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(id)
        .bind(&update.full_name)
        .bind(&update.phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn update_membership_status(
        &self,
        id: Uuid,
        status: MembershipStatus,
    ) -> Result<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(&format!(
            r#"
            UPDATE users
            SET membership_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn set_joining_fee_paid(&self, id: Uuid, paid: bool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET joining_fee_paid = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(paid)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn bulk_update_status(&self, ids: &[Uuid], status: MembershipStatus) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE users
            SET membership_status = $2, updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
