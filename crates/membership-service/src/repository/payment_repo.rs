//! 付款台账仓储

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::PaymentRepositoryTrait;
use crate::error::Result;
use crate::models::{NewPayment, Payment};

/// `amount` 在库中为 numeric，读取时转换为 float8
const PAYMENT_COLUMNS: &str = "id, user_id, receipt_id, amount::float8 AS amount, description, \
                               payment_date, created_at";

/// 付款台账仓储（`payments` 表）
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepositoryTrait for PaymentRepository {
    async fn create(&self, payment: &NewPayment) -> Result<Payment> {
        let created = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (id, user_id, receipt_id, amount, description,
                                  payment_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(payment.user_id)
        .bind(payment.receipt_id)
        .bind(payment.amount)
        .bind(&payment.description)
        .bind(payment.payment_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {}
            FROM payments
            WHERE user_id = $1
            ORDER BY payment_date DESC, created_at DESC
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    async fn list(&self, limit: i64) -> Result<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {}
            FROM payments
            ORDER BY payment_date DESC, created_at DESC
            LIMIT $1
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    async fn delete_by_receipt(&self, receipt_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM payments WHERE receipt_id = $1")
            .bind(receipt_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
