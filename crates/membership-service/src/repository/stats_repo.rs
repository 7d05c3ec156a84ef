//! 统计仓储
//!
//! 通过名称调用数据库存储过程，列类型在 SQL 中显式转换，避免存储过程返回 numeric 时解码失败

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::traits::StatsRepositoryTrait;
use crate::error::Result;
use crate::models::{DashboardOverview, DeactivationCandidate, MonthlyRevenue, UnpaidMember};

/// 统计仓储
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepositoryTrait for StatsRepository {
    async fn monthly_revenue(&self, year: i32) -> Result<Vec<MonthlyRevenue>> {
        let rows = sqlx::query_as::<_, MonthlyRevenue>(
            r#"
            SELECT month::int4 AS month,
                   COALESCE(total_amount, 0)::float8 AS total_amount,
                   COALESCE(payment_count, 0)::int8 AS payment_count
            FROM get_monthly_revenue(p_year => $1)
            ORDER BY month ASC
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn unpaid_members(&self, month: NaiveDate) -> Result<Vec<UnpaidMember>> {
        let rows = sqlx::query_as::<_, UnpaidMember>(
            r#"
            SELECT user_id, email, full_name, last_payment_date::date AS last_payment_date
            FROM get_unpaid_members(p_month => $1)
            "#,
        )
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn deactivation_candidates(&self, months: i32) -> Result<Vec<DeactivationCandidate>> {
        let rows = sqlx::query_as::<_, DeactivationCandidate>(
            r#"
            SELECT user_id, email, full_name,
                   last_payment_date::date AS last_payment_date,
                   months_since_payment::int4 AS months_since_payment
            FROM get_deactivation_candidates(p_months => $1)
            "#,
        )
        .bind(months)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn overview(&self, month_start: NaiveDate) -> Result<DashboardOverview> {
        let overview = sqlx::query_as::<_, DashboardOverview>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_members,
                (SELECT COUNT(*) FROM users WHERE membership_status = 'active') AS active_members,
                (SELECT COUNT(*) FROM users WHERE membership_status = 'pending') AS pending_members,
                (SELECT COUNT(*) FROM users WHERE membership_status = 'inactive') AS inactive_members,
                (SELECT COUNT(*) FROM receipts WHERE status = 'pending') AS pending_receipts,
                (SELECT COUNT(*) FROM reviews WHERE status = 'pending') AS pending_reviews,
                (SELECT COALESCE(SUM(amount), 0)::float8 FROM payments
                  WHERE payment_date >= $1) AS revenue_this_month
            "#,
        )
        .bind(month_start)
        .fetch_one(&self.pool)
        .await?;

        Ok(overview)
    }
}
