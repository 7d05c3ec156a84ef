//! 后台统计服务
//!
//! 聚合计算在数据库存储过程中完成，这里只负责参数整理和结果补齐

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::instrument;

use crate::error::{MembershipError, Result};
use crate::models::{DashboardOverview, UnpaidMember, YearlyRevenue};
use crate::repository::StatsRepositoryTrait;

/// 解析 YYYY-MM 为当月第一天
pub fn parse_month(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| MembershipError::Validation(format!("月份格式应为 YYYY-MM: {}", value)))
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// 后台统计服务
pub struct DashboardService {
    stats: Arc<dyn StatsRepositoryTrait>,
}

impl DashboardService {
    pub fn new(stats: Arc<dyn StatsRepositoryTrait>) -> Self {
        Self { stats }
    }

    /// 首页概览，收入按当月计算
    #[instrument(skip(self))]
    pub async fn overview(&self) -> Result<DashboardOverview> {
        self.stats
            .overview(month_start(Utc::now().date_naive()))
            .await
    }

    /// 全年月度收入，缺省为当年
    #[instrument(skip(self))]
    pub async fn monthly_revenue(&self, year: Option<i32>) -> Result<YearlyRevenue> {
        let year = year.unwrap_or_else(|| Utc::now().year());
        if !(2000..=2100).contains(&year) {
            return Err(MembershipError::Validation(format!("年份超出范围: {}", year)));
        }

        let rows = self.stats.monthly_revenue(year).await?;
        Ok(YearlyRevenue::from_rows(year, rows))
    }

    /// 指定月份未缴费会员，缺省为当月
    #[instrument(skip(self))]
    pub async fn unpaid_members(&self, month: Option<&str>) -> Result<Vec<UnpaidMember>> {
        let month = match month {
            Some(value) => parse_month(value)?,
            None => month_start(Utc::now().date_naive()),
        };
        self.stats.unpaid_members(month).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MonthlyRevenue;
    use crate::repository::MockStatsRepositoryTrait;
    use mockall::predicate::eq;

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-02").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("Feb 2024").is_err());
    }

    #[tokio::test]
    async fn test_monthly_revenue_fills_year() {
        let mut stats = MockStatsRepositoryTrait::new();
        stats
            .expect_monthly_revenue()
            .with(eq(2024))
            .returning(|_| {
                Ok(vec![MonthlyRevenue {
                    month: 5,
                    total_amount: 300.0,
                    payment_count: 6,
                }])
            });

        let service = DashboardService::new(Arc::new(stats));
        let revenue = service.monthly_revenue(Some(2024)).await.unwrap();
        assert_eq!(revenue.months.len(), 12);
        assert_eq!(revenue.total_amount, 300.0);
        assert_eq!(revenue.months[4].payment_count, 6);
    }

    #[tokio::test]
    async fn test_monthly_revenue_rejects_bad_year() {
        let service = DashboardService::new(Arc::new(MockStatsRepositoryTrait::new()));
        assert!(matches!(
            service.monthly_revenue(Some(1900)).await,
            Err(MembershipError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unpaid_members_passes_month_start() {
        let mut stats = MockStatsRepositoryTrait::new();
        stats
            .expect_unpaid_members()
            .with(eq(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()))
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = DashboardService::new(Arc::new(stats));
        assert!(service.unpaid_members(Some("2024-07")).await.unwrap().is_empty());
    }
}
