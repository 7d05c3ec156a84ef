//! 服务层数据传输对象
//!
//! 定义服务层的输入与输出结构，输入结构同时作为 HTTP 请求体使用

use chrono::{DateTime, Utc};
use gym_shared::auth_client::AuthSession;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Member, MemberRole, Payment, Receipt};

/// 当前操作者
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: MemberRole,
}

impl Actor {
    pub fn member(id: Uuid) -> Self {
        Self {
            id,
            role: MemberRole::Member,
        }
    }

    pub fn admin(id: Uuid) -> Self {
        Self {
            id,
            role: MemberRole::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}

/// 注册请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpInput {
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 6, max = 72, message = "密码长度须为 6-72 个字符"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "姓名长度须为 1-100 个字符"))]
    pub full_name: String,
    #[validate(length(max = 30, message = "电话号码过长"))]
    pub phone: Option<String>,
}

/// 登录请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInInput {
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 1, message = "密码不能为空"))]
    pub password: String,
}

/// 登录结果：托管认证会话加会员资料
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResult {
    pub session: AuthSession,
    pub member: Member,
}

/// 资料修改请求
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 100, message = "姓名长度须为 1-100 个字符"))]
    pub full_name: Option<String>,
    #[validate(length(max = 30, message = "电话号码过长"))]
    pub phone: Option<String>,
}

/// 上传收据
///
/// 由 HTTP 层从 multipart 表单组装
#[derive(Debug, Clone)]
pub struct UploadReceiptInput {
    pub user_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub amount: f64,
    pub description: Option<String>,
}

/// 驳回收据请求
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RejectReceiptInput {
    #[validate(length(max = 500, message = "驳回原因不能超过 500 个字符"))]
    pub reason: Option<String>,
}

/// 审核通过结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReceiptResult {
    pub receipt: Receipt,
    pub payment: Payment,
    /// 本次审核是否把会员标记为已缴入会费
    pub joining_fee_marked: bool,
}

/// 删除收据结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReceiptResult {
    pub receipt_id: Uuid,
    pub payments_deleted: u64,
    pub file_removed: bool,
}

/// 清理旧收据请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CleanupInput {
    #[validate(range(min = 1, max = 120, message = "月数须为 1-120"))]
    #[serde(default = "default_cleanup_months")]
    pub older_than_months: u32,
}

fn default_cleanup_months() -> u32 {
    6
}

impl Default for CleanupInput {
    fn default() -> Self {
        Self {
            older_than_months: default_cleanup_months(),
        }
    }
}

/// 清理旧收据结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub cutoff: Option<DateTime<Utc>>,
    pub scanned: usize,
    pub deleted: usize,
    /// 扫描后已被其他请求删除的记录
    pub skipped: usize,
    pub failed: usize,
    pub files_removed: bool,
}

/// 提交评价请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewInput {
    #[validate(range(min = 1, max = 5, message = "评分须为 1-5"))]
    pub rating: i32,
    #[validate(length(min = 10, max = 1000, message = "评价内容须为 10-1000 个字符"))]
    pub content: String,
}

/// 批量停用请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateMembersInput {
    #[validate(length(min = 1, max = 500, message = "会员列表须为 1-500 个"))]
    pub member_ids: Vec<Uuid>,
}

/// 批量停用结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateMembersResult {
    pub requested: usize,
    pub updated: u64,
}

/// 相册图片
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_validation() {
        let input = SignUpInput {
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            full_name: String::new(),
            phone: None,
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("full_name"));
    }

    #[test]
    fn test_submit_review_validation() {
        let ok = SubmitReviewInput {
            rating: 5,
            content: "Great coaches and clean floor".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = SubmitReviewInput {
            rating: 6,
            content: "short".to_string(),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rating"));
        assert!(errors.field_errors().contains_key("content"));
    }

    #[test]
    fn test_cleanup_input_default_months() {
        let input: CleanupInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.older_than_months, 6);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_actor_roles() {
        assert!(Actor::admin(Uuid::nil()).is_admin());
        assert!(!Actor::member(Uuid::nil()).is_admin());
    }
}
