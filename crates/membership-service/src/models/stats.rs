//! 后台统计结果
//!
//! 这些行由数据库存储过程聚合返回，本服务只做形状转换

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 月度收入（get_monthly_revenue）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    /// 1-12
    pub month: i32,
    pub total_amount: f64,
    pub payment_count: i64,
}

/// 指定月份未缴费会员（get_unpaid_members）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidMember {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    #[sqlx(default)]
    pub last_payment_date: Option<NaiveDate>,
}

/// 待停用会员（get_deactivation_candidates）
///
/// 状态为 active 但连续 N 个月没有已审核付款的会员
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeactivationCandidate {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    #[sqlx(default)]
    pub last_payment_date: Option<NaiveDate>,
    #[sqlx(default)]
    pub months_since_payment: Option<i32>,
}

/// 后台首页概览
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_members: i64,
    pub active_members: i64,
    pub pending_members: i64,
    pub inactive_members: i64,
    pub pending_receipts: i64,
    pub pending_reviews: i64,
    pub revenue_this_month: f64,
}

/// 全年收入汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRevenue {
    pub year: i32,
    pub total_amount: f64,
    /// 固定 12 个月，无付款的月份金额为 0
    pub months: Vec<MonthlyRevenue>,
}

impl YearlyRevenue {
    /// 补齐缺失月份
    pub fn from_rows(year: i32, rows: Vec<MonthlyRevenue>) -> Self {
        let months: Vec<MonthlyRevenue> = (1..=12)
            .map(|month| {
                rows.iter()
                    .find(|r| r.month == month)
                    .cloned()
                    .unwrap_or(MonthlyRevenue {
                        month,
                        total_amount: 0.0,
                        payment_count: 0,
                    })
            })
            .collect();
        let total_amount = months.iter().map(|m| m.total_amount).sum();

        Self {
            year,
            total_amount,
            months,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yearly_revenue_fills_missing_months() {
        let yearly = YearlyRevenue::from_rows(
            2024,
            vec![
                MonthlyRevenue {
                    month: 2,
                    total_amount: 120.0,
                    payment_count: 3,
                },
                MonthlyRevenue {
                    month: 11,
                    total_amount: 80.0,
                    payment_count: 2,
                },
            ],
        );

        assert_eq!(yearly.months.len(), 12);
        assert_eq!(yearly.months[0].total_amount, 0.0);
        assert_eq!(yearly.months[1].payment_count, 3);
        assert_eq!(yearly.months[10].total_amount, 80.0);
        assert_eq!(yearly.total_amount, 200.0);
    }
}
