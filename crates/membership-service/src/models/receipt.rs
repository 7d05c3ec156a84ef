//! 缴费收据实体与按月分组规则

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ReceiptStatus;

/// 缴费收据
///
/// 会员上传的付款凭证，文件本体保存在对象存储的收据桶中
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: Uuid,
    pub user_id: Uuid,
    /// 存储桶内路径: {user_id}/{millis}-{file_name}
    pub file_path: String,
    pub file_name: String,
    pub amount: f64,
    #[sqlx(default)]
    pub description: Option<String>,
    pub status: ReceiptStatus,
    #[sqlx(default)]
    pub rejection_reason: Option<String>,
    #[sqlx(default)]
    pub verified_by: Option<Uuid>,
    #[sqlx(default)]
    pub verified_at: Option<DateTime<Utc>>,
    pub uploaded_at: DateTime<Utc>,
}

impl Receipt {
    pub fn is_pending(&self) -> bool {
        self.status == ReceiptStatus::Pending
    }

    /// 上传月份，格式 YYYY-MM
    pub fn month_key(&self) -> String {
        self.uploaded_at.format("%Y-%m").to_string()
    }

    /// 收据说明是否提到入会费
    pub fn mentions_admin_fee(&self) -> bool {
        self.description.as_deref().is_some_and(mentions_admin_fee)
    }
}

/// 新建收据
#[derive(Debug, Clone, PartialEq)]
pub struct NewReceipt {
    pub user_id: Uuid,
    pub file_path: String,
    pub file_name: String,
    pub amount: f64,
    pub description: Option<String>,
}

static ADMIN_FEE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\badmin[\s-]+fee").expect("invalid admin fee pattern"));

/// 判断文本是否提到 "admin fee"（不区分大小写，单词间允许空白或连字符）
///
/// "admin" 须是独立单词，"sysadmin fee" 这类词中片段不算入会费
pub fn mentions_admin_fee(text: &str) -> bool {
    ADMIN_FEE_PATTERN.is_match(text)
}

/// 同一月份的收据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReceipts {
    /// YYYY-MM
    pub month: String,
    pub total_amount: f64,
    pub receipts: Vec<Receipt>,
}

/// 按上传月份分组
///
/// 月份倒序排列，组内收据按上传时间倒序
pub fn group_receipts_by_month(receipts: Vec<Receipt>) -> Vec<MonthlyReceipts> {
    let mut buckets: BTreeMap<String, Vec<Receipt>> = BTreeMap::new();
    for receipt in receipts {
        buckets.entry(receipt.month_key()).or_default().push(receipt);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(month, mut receipts)| {
            receipts.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
            let total_amount = receipts.iter().map(|r| r.amount).sum();
            MonthlyReceipts {
                month,
                total_amount,
                receipts,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn receipt_at(y: i32, m: u32, d: u32, amount: f64) -> Receipt {
        Receipt {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            file_path: "u/f.pdf".to_string(),
            file_name: "f.pdf".to_string(),
            amount,
            description: None,
            status: ReceiptStatus::Pending,
            rejection_reason: None,
            verified_by: None,
            verified_at: None,
            uploaded_at: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_mentions_admin_fee() {
        assert!(mentions_admin_fee("Admin Fee + January"));
        assert!(mentions_admin_fee("paid the ADMIN   fee today"));
        assert!(mentions_admin_fee("admin\tfee"));
        assert!(mentions_admin_fee("Admin-Fee for March"));
        assert!(!mentions_admin_fee("sysadmin fee"));
        assert!(!mentions_admin_fee("monthly fee"));
        assert!(!mentions_admin_fee("administration"));
        assert!(!mentions_admin_fee("adminfee"));
    }

    #[test]
    fn test_receipt_without_description_is_not_admin_fee() {
        assert!(!receipt_at(2024, 1, 1, 10.0).mentions_admin_fee());
    }

    #[test]
    fn test_group_receipts_by_month_orders_newest_first() {
        let receipts = vec![
            receipt_at(2024, 1, 5, 100.0),
            receipt_at(2024, 3, 1, 50.0),
            receipt_at(2023, 12, 31, 20.0),
            receipt_at(2024, 3, 20, 25.0),
        ];

        let groups = group_receipts_by_month(receipts);
        let months: Vec<&str> = groups.iter().map(|g| g.month.as_str()).collect();
        assert_eq!(months, vec!["2024-03", "2024-01", "2023-12"]);

        let march = &groups[0];
        assert_eq!(march.receipts.len(), 2);
        assert!(march.receipts[0].uploaded_at > march.receipts[1].uploaded_at);
        assert_eq!(march.total_amount, 75.0);
    }

    #[test]
    fn test_group_receipts_empty() {
        assert!(group_receipts_by_month(vec![]).is_empty());
    }
}
