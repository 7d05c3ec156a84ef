//! 收据仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::ReceiptRepositoryTrait;
use crate::error::Result;
use crate::models::{NewReceipt, Receipt, ReceiptStatus};

/// `amount` 可能是 numeric、`status` 可能是 text，统一转换为模型解码的类型
const RECEIPT_COLUMNS: &str = "id, user_id, file_path, file_name, amount::float8 AS amount, \
                               description, status::varchar AS status, rejection_reason, \
                               verified_by, verified_at, uploaded_at";

/// 收据仓储（`receipts` 表）
pub struct ReceiptRepository {
    pool: PgPool,
}

impl ReceiptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReceiptRepositoryTrait for ReceiptRepository {
    async fn create(&self, receipt: &NewReceipt) -> Result<Receipt> {
        let created = sqlx::query_as::<_, Receipt>(&format!(
            r#"
            INSERT INTO receipts (id, user_id, file_path, file_name, amount, description,
                                  status, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', NOW())
            RETURNING {}
            "#,
            RECEIPT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(receipt.user_id)
        .bind(&receipt.file_path)
        .bind(&receipt.file_name)
        .bind(receipt.amount)
        .bind(&receipt.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Receipt>> {
        let receipt = sqlx::query_as::<_, Receipt>(&format!(
            "SELECT {} FROM receipts WHERE id = $1",
            RECEIPT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(receipt)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Receipt>> {
        let receipts = sqlx::query_as::<_, Receipt>(&format!(
            r#"
            SELECT {}
            FROM receipts
            WHERE user_id = $1
            ORDER BY uploaded_at DESC
            "#,
            RECEIPT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(receipts)
    }

    async fn list(&self, status: Option<ReceiptStatus>) -> Result<Vec<Receipt>> {
        let receipts = sqlx::query_as::<_, Receipt>(&format!(
            r#"
            SELECT {}
            FROM receipts
            WHERE ($1::varchar IS NULL OR status = $1)
            ORDER BY uploaded_at DESC
            "#,
            RECEIPT_COLUMNS
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(receipts)
    }

    async fn mark_verified(&self, id: Uuid, verified_by: Uuid) -> Result<Option<Receipt>> {
        let receipt = sqlx::query_as::<_, Receipt>(&format!(
            r#"
            UPDATE receipts
            SET status = 'verified', verified_by = $2, verified_at = NOW(),
                rejection_reason = NULL
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            RECEIPT_COLUMNS
        ))
        .bind(id)
        .bind(verified_by)
        .fetch_optional(&self.pool)
        .await?;

        Ok(receipt)
    }

    async fn mark_rejected(
        &self,
        id: Uuid,
        verified_by: Uuid,
        reason: Option<String>,
    ) -> Result<Option<Receipt>> {
        let receipt = sqlx::query_as::<_, Receipt>(&format!(
            r#"
            UPDATE receipts
            SET status = 'rejected', verified_by = $2, verified_at = NOW(),
                rejection_reason = $3
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            RECEIPT_COLUMNS
        ))
        .bind(id)
        .bind(verified_by)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;

        Ok(receipt)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM receipts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_older_than(
        &self,
        status: ReceiptStatus,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Receipt>> {
        let receipts = sqlx::query_as::<_, Receipt>(&format!(
            r#"
            SELECT {}
            FROM receipts
            WHERE status = $1 AND uploaded_at < $2
            ORDER BY uploaded_at ASC
            "#,
            RECEIPT_COLUMNS
        ))
        .bind(status)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(receipts)
    }
}
