//! 会员服务领域模型
//!
//! 包含会员门户的所有核心实体定义，以及不依赖 IO 的业务规则

pub mod enums;
pub mod member;
pub mod payment;
pub mod receipt;
pub mod review;
pub mod stats;

// 重新导出常用类型
pub use enums::{MemberRole, MembershipStatus, ReceiptStatus, ReviewStatus};
pub use member::{Member, NewMember, ProfileUpdate};
pub use payment::{NewPayment, Payment, PaymentSummary};
pub use receipt::{
    MonthlyReceipts, NewReceipt, Receipt, group_receipts_by_month, mentions_admin_fee,
};
pub use review::{
    FEATURED_REVIEW_LIMIT, NewReview, REVIEW_INTERVAL_MONTHS, Review, ReviewEligibility,
    review_eligibility,
};
pub use stats::{
    DashboardOverview, DeactivationCandidate, MonthlyRevenue, UnpaidMember, YearlyRevenue,
};
