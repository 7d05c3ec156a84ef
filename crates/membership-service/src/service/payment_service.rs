//! 付款查询服务

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Payment, PaymentSummary};
use crate::repository::PaymentRepositoryTrait;

/// 后台付款列表默认条数
pub const DEFAULT_PAYMENT_LIMIT: i64 = 100;
const MAX_PAYMENT_LIMIT: i64 = 500;

/// 付款查询服务
pub struct PaymentService {
    payments: Arc<dyn PaymentRepositoryTrait>,
}

impl PaymentService {
    pub fn new(payments: Arc<dyn PaymentRepositoryTrait>) -> Self {
        Self { payments }
    }

    pub async fn list_user_payments(&self, user_id: Uuid) -> Result<Vec<Payment>> {
        self.payments.list_by_user(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn payment_summary(&self, user_id: Uuid) -> Result<PaymentSummary> {
        let payments = self.payments.list_by_user(user_id).await?;
        Ok(PaymentSummary::from_payments(&payments))
    }

    /// 后台付款列表，条数限制在 1-500
    pub async fn list_payments(&self, limit: Option<i64>) -> Result<Vec<Payment>> {
        let limit = limit
            .unwrap_or(DEFAULT_PAYMENT_LIMIT)
            .clamp(1, MAX_PAYMENT_LIMIT);
        self.payments.list(limit).await
    }
}
