//! 业务服务层
//!
//! 每个服务依赖仓储 trait 与托管服务 trait，便于在测试中替换为内存实现或 mock

mod account_service;
mod dashboard_service;
pub mod dto;
mod gallery_service;
mod member_service;
mod payment_service;
mod receipt_service;
mod review_service;

pub use account_service::AccountService;
pub use dashboard_service::{DashboardService, parse_month};
pub use gallery_service::GalleryService;
pub use member_service::{DEFAULT_DEACTIVATION_MONTHS, MemberService};
pub use payment_service::{DEFAULT_PAYMENT_LIMIT, PaymentService};
pub use receipt_service::{ALLOWED_RECEIPT_TYPES, ReceiptService, ReceiptSettings, sanitize_file_name};
pub use review_service::ReviewService;
