//! 请求 DTO 定义
//!
//! 查询参数与少量门户特有的请求体

use membership::{MembershipStatus, ReceiptStatus, ReviewStatus};
use serde::Deserialize;
use validator::Validate;

/// 刷新令牌请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh token 不能为空"))]
    pub refresh_token: String,
}

/// 收据列表过滤
#[derive(Debug, Default, Deserialize)]
pub struct ReceiptListQuery {
    pub status: Option<ReceiptStatus>,
}

/// 评价列表过滤
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub status: Option<ReviewStatus>,
}

/// 会员列表过滤
#[derive(Debug, Default, Deserialize)]
pub struct MemberListQuery {
    pub status: Option<MembershipStatus>,
}

/// 付款列表参数
#[derive(Debug, Default, Deserialize)]
pub struct PaymentListQuery {
    pub limit: Option<i64>,
}

/// 年度收入查询
#[derive(Debug, Default, Deserialize)]
pub struct RevenueQuery {
    pub year: Option<i32>,
}

/// 欠费会员查询，月份格式 YYYY-MM
#[derive(Debug, Default, Deserialize)]
pub struct UnpaidQuery {
    pub month: Option<String>,
}

/// 待停用会员查询
#[derive(Debug, Default, Deserialize)]
pub struct CandidatesQuery {
    pub months: Option<i32>,
}

/// 修改会籍状态请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMembershipStatusRequest {
    pub status: MembershipStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_request_requires_token() {
        let req: RefreshRequest = serde_json::from_str(r#"{"refreshToken": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_status_filters_parse_lowercase() {
        let q: ReceiptListQuery = serde_json::from_str(r#"{"status": "pending"}"#).unwrap();
        assert_eq!(q.status, Some(ReceiptStatus::Pending));

        let req: UpdateMembershipStatusRequest =
            serde_json::from_str(r#"{"status": "inactive"}"#).unwrap();
        assert_eq!(req.status, MembershipStatus::Inactive);
    }
}
