//! 付款台账实体

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 付款记录
///
/// 收据审核通过时生成，与收据一一对应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(default)]
    pub receipt_id: Option<Uuid>,
    pub amount: f64,
    #[sqlx(default)]
    pub description: Option<String>,
    pub payment_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// 新建付款记录
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub user_id: Uuid,
    pub receipt_id: Uuid,
    pub amount: f64,
    pub description: Option<String>,
    pub payment_date: NaiveDate,
}

/// 会员付款汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub total_paid: f64,
    pub payment_count: usize,
    pub last_payment_date: Option<NaiveDate>,
}

impl PaymentSummary {
    pub fn from_payments(payments: &[Payment]) -> Self {
        Self {
            total_paid: payments.iter().map(|p| p.amount).sum(),
            payment_count: payments.len(),
            last_payment_date: payments.iter().map(|p| p.payment_date).max(),
        }
    }
}
