//! 会员服务枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化，数据库中以小写字符串存储

use serde::{Deserialize, Serialize};

/// 会员角色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum MemberRole {
    #[default]
    Member,
    /// 管理员可以审核收据、评价并查看统计
    Admin,
}

/// 会籍状态
///
/// 新注册会员为待激活，首笔收据审核通过后由管理员激活
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum MembershipStatus {
    #[default]
    Pending,
    Active,
    Inactive,
}

/// 收据状态
///
/// 生命周期: pending -> verified / rejected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum ReceiptStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

/// 评价审核状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

macro_rules! impl_as_str {
    ($ty:ty { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_as_str!(MemberRole { Member => "member", Admin => "admin" });
impl_as_str!(MembershipStatus { Pending => "pending", Active => "active", Inactive => "inactive" });
impl_as_str!(ReceiptStatus { Pending => "pending", Verified => "verified", Rejected => "rejected" });
impl_as_str!(ReviewStatus { Pending => "pending", Approved => "approved", Rejected => "rejected" });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReceiptStatus::Verified).unwrap(),
            "\"verified\""
        );
        let status: MembershipStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, MembershipStatus::Inactive);
        assert!(serde_json::from_str::<ReviewStatus>("\"APPROVED\"").is_err());
    }

    #[test]
    fn test_enum_defaults() {
        assert_eq!(MemberRole::default(), MemberRole::Member);
        assert_eq!(MembershipStatus::default(), MembershipStatus::Pending);
        assert_eq!(ReceiptStatus::default(), ReceiptStatus::Pending);
        assert_eq!(ReviewStatus::default(), ReviewStatus::Pending);
    }

    #[test]
    fn test_enum_display() {
        assert_eq!(MemberRole::Admin.to_string(), "admin");
        assert_eq!(ReviewStatus::Rejected.as_str(), "rejected");
    }
}
