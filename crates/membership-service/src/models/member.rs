//! 会员资料实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{MemberRole, MembershipStatus};

/// 会员资料（`users` 表）
///
/// id 与托管认证服务中的用户 id 一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[sqlx(default)]
    pub phone: Option<String>,
    pub role: MemberRole,
    pub membership_status: MembershipStatus,
    /// 入会费（admin fee）是否已缴
    pub joining_fee_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}

/// 新建会员资料
#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
}

/// 会员可自行修改的资料字段，None 表示保持不变
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}
