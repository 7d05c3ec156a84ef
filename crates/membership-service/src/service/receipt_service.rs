//! 收据服务
//!
//! 会员上传缴费收据，管理员审核。审核通过会生成付款记录，
//! 说明中提到 admin fee 时同时标记入会费已缴。
//!
//! 所有多步操作都不是原子的：后续步骤失败时前面的远程写入不会回滚。

use std::sync::Arc;

use chrono::{Months, Utc};
use gym_shared::observability::metrics;
use gym_shared::storage::ObjectStorage;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{MembershipError, Result};
use crate::models::{
    MonthlyReceipts, NewPayment, NewReceipt, Receipt, ReceiptStatus, group_receipts_by_month,
};
use crate::repository::{MemberRepositoryTrait, PaymentRepositoryTrait, ReceiptRepositoryTrait};
use crate::service::dto::{
    Actor, CleanupInput, CleanupReport, DeleteReceiptResult, RejectReceiptInput,
    UploadReceiptInput, VerifyReceiptResult,
};

/// 允许上传的收据文件类型
pub const ALLOWED_RECEIPT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "application/pdf",
];

/// 收据存储相关设置
#[derive(Debug, Clone)]
pub struct ReceiptSettings {
    pub bucket: String,
    pub max_upload_bytes: usize,
    pub signed_url_ttl_seconds: u64,
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        Self {
            bucket: "receipts".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            signed_url_ttl_seconds: 3600,
        }
    }
}

/// 文件名只保留字母、数字和 `._-`，其余字符替换为下划线
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(100)
        .collect();

    if cleaned.trim_matches(['.', '_']).is_empty() {
        "receipt".to_string()
    } else {
        cleaned
    }
}

/// 收据服务
pub struct ReceiptService {
    receipts: Arc<dyn ReceiptRepositoryTrait>,
    payments: Arc<dyn PaymentRepositoryTrait>,
    members: Arc<dyn MemberRepositoryTrait>,
    storage: Arc<dyn ObjectStorage>,
    settings: ReceiptSettings,
}

impl ReceiptService {
    pub fn new(
        receipts: Arc<dyn ReceiptRepositoryTrait>,
        payments: Arc<dyn PaymentRepositoryTrait>,
        members: Arc<dyn MemberRepositoryTrait>,
        storage: Arc<dyn ObjectStorage>,
        settings: ReceiptSettings,
    ) -> Self {
        Self {
            receipts,
            payments,
            members,
            storage,
            settings,
        }
    }

    pub fn settings(&self) -> &ReceiptSettings {
        &self.settings
    }

    fn validate_upload(&self, input: &UploadReceiptInput) -> Result<()> {
        if input.bytes.is_empty() {
            return Err(MembershipError::Validation("请选择要上传的文件".to_string()));
        }
        if input.bytes.len() > self.settings.max_upload_bytes {
            return Err(MembershipError::Validation(format!(
                "文件大小不能超过 {} MB",
                self.settings.max_upload_bytes / (1024 * 1024)
            )));
        }
        if !ALLOWED_RECEIPT_TYPES.contains(&input.content_type.as_str()) {
            return Err(MembershipError::Validation(format!(
                "不支持的文件类型: {}",
                input.content_type
            )));
        }
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(MembershipError::Validation("金额必须大于 0".to_string()));
        }
        if input
            .description
            .as_ref()
            .is_some_and(|d| d.chars().count() > 500)
        {
            return Err(MembershipError::Validation(
                "说明不能超过 500 个字符".to_string(),
            ));
        }
        Ok(())
    }

    /// 上传收据
    ///
    /// 文件先写入存储桶，再插入 pending 记录；插入失败时尽力删除已上传的文件
    #[instrument(skip(self, input), fields(user_id = %input.user_id, size = input.bytes.len()))]
    pub async fn upload_receipt(&self, input: UploadReceiptInput) -> Result<Receipt> {
        if let Err(e) = self.validate_upload(&input) {
            metrics::record_receipt_upload("rejected");
            return Err(e);
        }

        let file_name = sanitize_file_name(&input.file_name);
        let file_path = format!(
            "{}/{}-{}",
            input.user_id,
            Utc::now().timestamp_millis(),
            file_name
        );

        if let Err(e) = self
            .storage
            .upload(
                &self.settings.bucket,
                &file_path,
                input.bytes,
                &input.content_type,
            )
            .await
        {
            error!(file_path = %file_path, error = %e, "收据文件上传失败");
            metrics::record_receipt_upload("failed");
            return Err(e.into());
        }

        let new_receipt = NewReceipt {
            user_id: input.user_id,
            file_path: file_path.clone(),
            file_name,
            amount: input.amount,
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        };

        let receipt = match self.receipts.create(&new_receipt).await {
            Ok(receipt) => receipt,
            Err(e) => {
                error!(file_path = %file_path, error = %e, "收据记录写入失败，清理已上传文件");
                if let Err(remove_err) = self
                    .storage
                    .remove(&self.settings.bucket, vec![file_path.clone()])
                    .await
                {
                    warn!(file_path = %file_path, error = %remove_err, "孤立收据文件清理失败");
                }
                metrics::record_receipt_upload("failed");
                return Err(e);
            }
        };

        metrics::record_receipt_upload("success");
        info!(receipt_id = %receipt.id, amount = receipt.amount, "收据上传成功");
        Ok(receipt)
    }

    /// 会员自己的收据（上传时间倒序）
    pub async fn list_user_receipts(&self, user_id: Uuid) -> Result<Vec<Receipt>> {
        self.receipts.list_by_user(user_id).await
    }

    /// 会员自己的收据，按月份分组
    pub async fn list_user_receipts_by_month(&self, user_id: Uuid) -> Result<Vec<MonthlyReceipts>> {
        let receipts = self.receipts.list_by_user(user_id).await?;
        Ok(group_receipts_by_month(receipts))
    }

    /// 后台收据列表
    pub async fn list_receipts(&self, status: Option<ReceiptStatus>) -> Result<Vec<Receipt>> {
        self.receipts.list(status).await
    }

    async fn get_receipt(&self, receipt_id: Uuid) -> Result<Receipt> {
        self.receipts
            .get(receipt_id)
            .await?
            .ok_or(MembershipError::ReceiptNotFound(receipt_id))
    }

    /// 收据文件的签名下载链接，仅本人或管理员可获取
    #[instrument(skip(self))]
    pub async fn receipt_file_url(&self, receipt_id: Uuid, actor: Actor) -> Result<String> {
        let receipt = self.get_receipt(receipt_id).await?;
        if !actor.is_admin() && receipt.user_id != actor.id {
            return Err(MembershipError::Forbidden("只能查看自己的收据".to_string()));
        }

        Ok(self
            .storage
            .signed_url(
                &self.settings.bucket,
                &receipt.file_path,
                self.settings.signed_url_ttl_seconds,
            )
            .await?)
    }

    /// 审核通过收据
    ///
    /// 1. 收据标记为 verified
    /// 2. 生成付款记录
    /// 3. 说明中提到 admin fee 时标记入会费已缴，此步失败只记录日志
    #[instrument(skip(self))]
    pub async fn verify_receipt(&self, receipt_id: Uuid, admin_id: Uuid) -> Result<VerifyReceiptResult> {
        let receipt = self.get_receipt(receipt_id).await?;
        if !receipt.is_pending() {
            metrics::record_receipt_review("approve", "invalid_status");
            return Err(MembershipError::InvalidReceiptStatus {
                receipt_id,
                current_status: receipt.status.to_string(),
            });
        }

        // 条件更新，期间被其他管理员处理过则返回 None
        let receipt = self
            .receipts
            .mark_verified(receipt_id, admin_id)
            .await?
            .ok_or_else(|| MembershipError::InvalidReceiptStatus {
                receipt_id,
                current_status: "processed".to_string(),
            })?;

        let new_payment = NewPayment {
            user_id: receipt.user_id,
            receipt_id: receipt.id,
            amount: receipt.amount,
            description: receipt.description.clone(),
            payment_date: receipt
                .verified_at
                .unwrap_or_else(Utc::now)
                .date_naive(),
        };

        let payment = self.payments.create(&new_payment).await.inspect_err(|e| {
            error!(receipt_id = %receipt_id, error = %e, "收据已审核，但付款记录写入失败");
            metrics::record_receipt_review("approve", "failed");
        })?;

        let mut joining_fee_marked = false;
        if receipt.mentions_admin_fee() {
            match self.members.set_joining_fee_paid(receipt.user_id, true).await {
                Ok(true) => joining_fee_marked = true,
                Ok(false) => {
                    warn!(user_id = %receipt.user_id, "入会费标记未生效：会员资料不存在")
                }
                Err(e) => {
                    warn!(user_id = %receipt.user_id, error = %e, "入会费标记失败，收据审核结果不受影响")
                }
            }
        }

        metrics::record_receipt_review("approve", "success");
        info!(
            receipt_id = %receipt_id,
            payment_id = %payment.id,
            joining_fee_marked,
            "收据审核通过"
        );

        Ok(VerifyReceiptResult {
            receipt,
            payment,
            joining_fee_marked,
        })
    }

    /// 驳回收据
    #[instrument(skip(self, input))]
    pub async fn reject_receipt(
        &self,
        receipt_id: Uuid,
        admin_id: Uuid,
        input: RejectReceiptInput,
    ) -> Result<Receipt> {
        input.validate()?;

        let receipt = self.get_receipt(receipt_id).await?;
        if !receipt.is_pending() {
            metrics::record_receipt_review("reject", "invalid_status");
            return Err(MembershipError::InvalidReceiptStatus {
                receipt_id,
                current_status: receipt.status.to_string(),
            });
        }

        let reason = input
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let receipt = self
            .receipts
            .mark_rejected(receipt_id, admin_id, reason)
            .await?
            .ok_or_else(|| MembershipError::InvalidReceiptStatus {
                receipt_id,
                current_status: "processed".to_string(),
            })?;

        metrics::record_receipt_review("reject", "success");
        info!(receipt_id = %receipt_id, "收据已驳回");
        Ok(receipt)
    }

    /// 删除收据
    ///
    /// 已审核的收据先删除关联付款记录，再删除收据行，最后尽力删除存储文件。
    /// 会员只能删除自己未审核通过的收据，管理员可删除任意收据。
    #[instrument(skip(self))]
    pub async fn delete_receipt(&self, receipt_id: Uuid, actor: Actor) -> Result<DeleteReceiptResult> {
        let receipt = self.get_receipt(receipt_id).await?;

        if !actor.is_admin() {
            if receipt.user_id != actor.id {
                return Err(MembershipError::Forbidden("只能删除自己的收据".to_string()));
            }
            if receipt.status == ReceiptStatus::Verified {
                return Err(MembershipError::Forbidden(
                    "已审核通过的收据不能删除".to_string(),
                ));
            }
        }

        let mut payments_deleted = 0;
        if receipt.status == ReceiptStatus::Verified {
            payments_deleted = self.payments.delete_by_receipt(receipt_id).await?;
        }

        if !self.receipts.delete(receipt_id).await? {
            return Err(MembershipError::ReceiptNotFound(receipt_id));
        }

        let file_removed = match self
            .storage
            .remove(&self.settings.bucket, vec![receipt.file_path.clone()])
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(file_path = %receipt.file_path, error = %e, "收据文件删除失败");
                false
            }
        };

        info!(receipt_id = %receipt_id, payments_deleted, file_removed, "收据已删除");
        Ok(DeleteReceiptResult {
            receipt_id,
            payments_deleted,
            file_removed,
        })
    }

    /// 清理过期的已驳回收据（记录与文件）
    #[instrument(skip(self))]
    pub async fn cleanup_old_receipts(&self, input: CleanupInput) -> Result<CleanupReport> {
        input.validate()?;

        let cutoff = Utc::now()
            .checked_sub_months(Months::new(input.older_than_months))
            .ok_or_else(|| MembershipError::Validation("清理月数超出范围".to_string()))?;

        let candidates = self
            .receipts
            .list_older_than(ReceiptStatus::Rejected, cutoff)
            .await?;

        let mut report = CleanupReport {
            cutoff: Some(cutoff),
            scanned: candidates.len(),
            ..Default::default()
        };
        let mut removed_paths = Vec::with_capacity(candidates.len());

        for receipt in candidates {
            match self.receipts.delete(receipt.id).await {
                Ok(true) => {
                    report.deleted += 1;
                    removed_paths.push(receipt.file_path);
                }
                Ok(false) => {
                    debug!(receipt_id = %receipt.id, "旧收据已不存在，跳过");
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!(receipt_id = %receipt.id, error = %e, "旧收据删除失败");
                    report.failed += 1;
                }
            }
        }

        report.files_removed = if removed_paths.is_empty() {
            true
        } else {
            match self
                .storage
                .remove(&self.settings.bucket, removed_paths)
                .await
            {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "旧收据文件删除失败");
                    false
                }
            }
        };

        info!(
            scanned = report.scanned,
            deleted = report.deleted,
            skipped = report.skipped,
            failed = report.failed,
            "旧收据清理完成"
        );
        Ok(report)
    }
}
