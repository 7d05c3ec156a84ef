//! 会员评价实体与提交频率规则

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ReviewStatus;

/// 两次评价之间的最短间隔（月）
pub const REVIEW_INTERVAL_MONTHS: u32 = 3;

/// 同时精选的评价上限
pub const FEATURED_REVIEW_LIMIT: usize = 10;

/// 会员评价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    /// 展示用署名，提交时取会员姓名
    pub author_name: String,
    /// 1-5 星
    pub rating: i32,
    pub content: String,
    pub status: ReviewStatus,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建评价
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub user_id: Uuid,
    pub author_name: String,
    pub rating: i32,
    pub content: String,
}

/// 评价提交资格
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEligibility {
    pub can_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review_at: Option<DateTime<Utc>>,
    /// 不可提交时给出下次可提交时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_eligible_at: Option<DateTime<Utc>>,
}

/// 计算评价提交资格
///
/// 下次可提交时间为上次提交时间加 3 个自然月，月末日期向前对齐（如 11-30 -> 02-28）
pub fn review_eligibility(
    last_review_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ReviewEligibility {
    let Some(last) = last_review_at else {
        return ReviewEligibility {
            can_submit: true,
            last_review_at: None,
            next_eligible_at: None,
        };
    };

    let next = last
        .checked_add_months(Months::new(REVIEW_INTERVAL_MONTHS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    if now < next {
        ReviewEligibility {
            can_submit: false,
            last_review_at: Some(last),
            next_eligible_at: Some(next),
        }
    } else {
        ReviewEligibility {
            can_submit: true,
            last_review_at: Some(last),
            next_eligible_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_no_previous_review_can_submit() {
        let eligibility = review_eligibility(None, Utc::now());
        assert!(eligibility.can_submit);
        assert!(eligibility.next_eligible_at.is_none());
    }

    #[test]
    fn test_recent_review_blocks_with_next_date() {
        let eligibility = review_eligibility(Some(at(2024, 1, 15)), at(2024, 3, 1));
        assert!(!eligibility.can_submit);
        assert_eq!(eligibility.next_eligible_at, Some(at(2024, 4, 15)));
    }

    #[test]
    fn test_exactly_three_months_later_can_submit() {
        let eligibility = review_eligibility(Some(at(2024, 1, 15)), at(2024, 4, 15));
        assert!(eligibility.can_submit);
        assert_eq!(eligibility.last_review_at, Some(at(2024, 1, 15)));
    }

    #[test]
    fn test_end_of_month_is_clamped() {
        let eligibility = review_eligibility(Some(at(2023, 11, 30)), at(2023, 12, 1));
        assert_eq!(eligibility.next_eligible_at, Some(at(2024, 2, 29)));
    }
}
