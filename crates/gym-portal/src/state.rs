//! 应用状态定义
//!
//! 包含 Axum 路由共享的业务服务与令牌校验器

use std::sync::Arc;

use gym_shared::auth_client::AuthProvider;
use gym_shared::database::Database;
use gym_shared::storage::ObjectStorage;
use membership::repository::{
    MemberRepositoryTrait, PaymentRepositoryTrait, ReceiptRepositoryTrait, ReviewRepositoryTrait,
    StatsRepositoryTrait,
};
use membership::service::ReceiptSettings;
use membership::{
    AccountService, DashboardService, GalleryService, MemberService, PaymentService,
    ReceiptService, ReviewService,
};

use crate::auth::JwtVerifier;

/// 构造服务所需的全部后端依赖
///
/// 生产环境由数据库仓储和托管服务客户端组成，测试中替换为内存实现
#[derive(Clone)]
pub struct Backends {
    pub members: Arc<dyn MemberRepositoryTrait>,
    pub receipts: Arc<dyn ReceiptRepositoryTrait>,
    pub payments: Arc<dyn PaymentRepositoryTrait>,
    pub reviews: Arc<dyn ReviewRepositoryTrait>,
    pub stats: Arc<dyn StatsRepositoryTrait>,
    pub auth: Arc<dyn AuthProvider>,
    pub storage: Arc<dyn ObjectStorage>,
}

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub receipts: Arc<ReceiptService>,
    pub payments: Arc<PaymentService>,
    pub reviews: Arc<ReviewService>,
    pub members: Arc<MemberService>,
    pub dashboard: Arc<DashboardService>,
    pub gallery: Arc<GalleryService>,
    pub jwt: JwtVerifier,
    /// 就绪探针使用；测试中为空
    pub database: Option<Database>,
}

impl AppState {
    /// 由后端依赖组装全部业务服务
    pub fn new(
        backends: Backends,
        receipt_settings: ReceiptSettings,
        gallery_bucket: impl Into<String>,
        jwt: JwtVerifier,
    ) -> Self {
        let Backends {
            members,
            receipts,
            payments,
            reviews,
            stats,
            auth,
            storage,
        } = backends;

        Self {
            accounts: Arc::new(AccountService::new(auth, members.clone())),
            receipts: Arc::new(ReceiptService::new(
                receipts,
                payments.clone(),
                members.clone(),
                storage.clone(),
                receipt_settings,
            )),
            payments: Arc::new(PaymentService::new(payments)),
            reviews: Arc::new(ReviewService::new(reviews, members.clone())),
            members: Arc::new(MemberService::new(members, stats.clone())),
            dashboard: Arc::new(DashboardService::new(stats)),
            gallery: Arc::new(GalleryService::new(storage, gallery_bucket)),
            jwt,
            database: None,
        }
    }

    /// 挂载数据库句柄（用于就绪探针）
    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// 收据上传大小上限（字节）
    pub fn max_upload_bytes(&self) -> usize {
        self.receipts.settings().max_upload_bytes
    }
}
