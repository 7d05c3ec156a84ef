//! 测试工具模块
//!
//! 提供内存版仓储、托管认证与对象存储的测试替身，
//! 供本 crate 的服务测试和 gym-portal 的路由测试使用。

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use gym_shared::auth_client::{AuthProvider, AuthSession, AuthUser};
use gym_shared::error::{GymError, Result as GymResult};
use gym_shared::storage::{ObjectStorage, StoredObject};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    DashboardOverview, DeactivationCandidate, Member, MemberRole, MembershipStatus,
    MonthlyRevenue, NewMember, NewPayment, NewReceipt, NewReview, Payment, ProfileUpdate, Receipt,
    ReceiptStatus, Review, ReviewStatus, UnpaidMember,
};
use crate::repository::{
    MemberRepositoryTrait, PaymentRepositoryTrait, ReceiptRepositoryTrait, ReviewRepositoryTrait,
    StatsRepositoryTrait,
};

// ==================== 会员 ====================

/// 内存会员仓储
#[derive(Default)]
pub struct InMemoryMemberRepository {
    members: RwLock<HashMap<Uuid, Member>>,
}

impl InMemoryMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入一条会员记录（可指定角色与状态）
    pub fn insert(&self, member: Member) {
        self.members
            .write()
            .expect("lock poisoned")
            .insert(member.id, member);
    }

    /// 快速构造会员记录
    pub fn seed(&self, email: &str, role: MemberRole, status: MembershipStatus) -> Member {
        let now = Utc::now();
        let member = Member {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: email.split('@').next().unwrap_or(email).to_string(),
            phone: None,
            role,
            membership_status: status,
            joining_fee_paid: false,
            created_at: now,
            updated_at: now,
        };
        self.insert(member.clone());
        member
    }

    fn update<F>(&self, id: Uuid, f: F) -> Option<Member>
    where
        F: FnOnce(&mut Member),
    {
        let mut members = self.members.write().expect("lock poisoned");
        members.get_mut(&id).map(|m| {
            f(m);
            m.updated_at = Utc::now();
            m.clone()
        })
    }
}

#[async_trait]
impl MemberRepositoryTrait for InMemoryMemberRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Member>> {
        Ok(self.members.read().expect("lock poisoned").get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>> {
        Ok(self
            .members
            .read()
            .expect("lock poisoned")
            .values()
            .find(|m| m.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, member: &NewMember) -> Result<Member> {
        let now = Utc::now();
        let created = Member {
            id: member.id,
            email: member.email.clone(),
            full_name: member.full_name.clone(),
            phone: member.phone.clone(),
            role: MemberRole::Member,
            membership_status: MembershipStatus::Pending,
            joining_fee_paid: false,
            created_at: now,
            updated_at: now,
        };
        self.insert(created.clone());
        Ok(created)
    }

    async fn list(&self, status: Option<MembershipStatus>) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self
            .members
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|m| status.is_none_or(|s| m.membership_status == s))
            .cloned()
            .collect();
        members.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(members)
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Option<Member>> {
        Ok(self.update(id, |m| {
            if let Some(name) = &update.full_name {
                m.full_name = name.clone();
            }
            if let Some(phone) = &update.phone {
                m.phone = Some(phone.clone());
            }
        }))
    }

    async fn update_membership_status(
        &self,
        id: Uuid,
        status: MembershipStatus,
    ) -> Result<Option<Member>> {
        Ok(self.update(id, |m| m.membership_status = status))
    }

    async fn set_joining_fee_paid(&self, id: Uuid, paid: bool) -> Result<bool> {
        Ok(self.update(id, |m| m.joining_fee_paid = paid).is_some())
    }

    async fn bulk_update_status(&self, ids: &[Uuid], status: MembershipStatus) -> Result<u64> {
        let mut updated = 0;
        for id in ids {
            if self.update(*id, |m| m.membership_status = status).is_some() {
                updated += 1;
            }
        }
        Ok(updated)
    }
}

// ==================== 收据 ====================

/// 内存收据仓储
#[derive(Default)]
pub struct InMemoryReceiptRepository {
    receipts: RwLock<HashMap<Uuid, Receipt>>,
}

impl InMemoryReceiptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 修改上传时间，用于模拟历史收据
    pub fn backdate(&self, id: Uuid, uploaded_at: DateTime<Utc>) {
        if let Some(r) = self.receipts.write().expect("lock poisoned").get_mut(&id) {
            r.uploaded_at = uploaded_at;
        }
    }

    fn transition(
        &self,
        id: Uuid,
        verified_by: Uuid,
        status: ReceiptStatus,
        reason: Option<String>,
    ) -> Option<Receipt> {
        let mut receipts = self.receipts.write().expect("lock poisoned");
        let receipt = receipts.get_mut(&id).filter(|r| r.is_pending())?;
        receipt.status = status;
        receipt.verified_by = Some(verified_by);
        receipt.verified_at = Some(Utc::now());
        receipt.rejection_reason = reason;
        Some(receipt.clone())
    }

    fn sorted(mut receipts: Vec<Receipt>) -> Vec<Receipt> {
        receipts.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        receipts
    }
}

#[async_trait]
impl ReceiptRepositoryTrait for InMemoryReceiptRepository {
    async fn create(&self, receipt: &NewReceipt) -> Result<Receipt> {
        let created = Receipt {
            id: Uuid::new_v4(),
            user_id: receipt.user_id,
            file_path: receipt.file_path.clone(),
            file_name: receipt.file_name.clone(),
            amount: receipt.amount,
            description: receipt.description.clone(),
            status: ReceiptStatus::Pending,
            rejection_reason: None,
            verified_by: None,
            verified_at: None,
            uploaded_at: Utc::now(),
        };
        self.receipts
            .write()
            .expect("lock poisoned")
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Receipt>> {
        Ok(self.receipts.read().expect("lock poisoned").get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Receipt>> {
        let receipts = self
            .receipts
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        Ok(Self::sorted(receipts))
    }

    async fn list(&self, status: Option<ReceiptStatus>) -> Result<Vec<Receipt>> {
        let receipts = self
            .receipts
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        Ok(Self::sorted(receipts))
    }

    async fn mark_verified(&self, id: Uuid, verified_by: Uuid) -> Result<Option<Receipt>> {
        Ok(self.transition(id, verified_by, ReceiptStatus::Verified, None))
    }

    async fn mark_rejected(
        &self,
        id: Uuid,
        verified_by: Uuid,
        reason: Option<String>,
    ) -> Result<Option<Receipt>> {
        Ok(self.transition(id, verified_by, ReceiptStatus::Rejected, reason))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self
            .receipts
            .write()
            .expect("lock poisoned")
            .remove(&id)
            .is_some())
    }

    async fn list_older_than(
        &self,
        status: ReceiptStatus,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Receipt>> {
        Ok(self
            .receipts
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|r| r.status == status && r.uploaded_at < cutoff)
            .cloned()
            .collect())
    }
}

// ==================== 付款 ====================

/// 内存付款仓储
#[derive(Default)]
pub struct InMemoryPaymentRepository {
    payments: RwLock<Vec<Payment>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepositoryTrait for InMemoryPaymentRepository {
    async fn create(&self, payment: &NewPayment) -> Result<Payment> {
        let created = Payment {
            id: Uuid::new_v4(),
            user_id: payment.user_id,
            receipt_id: Some(payment.receipt_id),
            amount: payment.amount,
            description: payment.description.clone(),
            payment_date: payment.payment_date,
            created_at: Utc::now(),
        };
        self.payments
            .write()
            .expect("lock poisoned")
            .push(created.clone());
        Ok(created)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .payments
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(payments)
    }

    async fn list(&self, limit: i64) -> Result<Vec<Payment>> {
        let mut payments = self.payments.read().expect("lock poisoned").clone();
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        payments.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(payments)
    }

    async fn delete_by_receipt(&self, receipt_id: Uuid) -> Result<u64> {
        let mut payments = self.payments.write().expect("lock poisoned");
        let before = payments.len();
        payments.retain(|p| p.receipt_id != Some(receipt_id));
        Ok((before - payments.len()) as u64)
    }
}

// ==================== 评价 ====================

/// 内存评价仓储
#[derive(Default)]
pub struct InMemoryReviewRepository {
    reviews: RwLock<HashMap<Uuid, Review>>,
}

impl InMemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 修改提交时间，用于模拟历史评价
    pub fn backdate(&self, id: Uuid, created_at: DateTime<Utc>) {
        if let Some(r) = self.reviews.write().expect("lock poisoned").get_mut(&id) {
            r.created_at = created_at;
        }
    }

    fn update<F>(&self, id: Uuid, f: F) -> Option<Review>
    where
        F: FnOnce(&mut Review),
    {
        let mut reviews = self.reviews.write().expect("lock poisoned");
        reviews.get_mut(&id).map(|r| {
            f(r);
            r.updated_at = Utc::now();
            r.clone()
        })
    }

    fn sorted_by_created(mut reviews: Vec<Review>) -> Vec<Review> {
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews
    }
}

#[async_trait]
impl ReviewRepositoryTrait for InMemoryReviewRepository {
    async fn create(&self, review: &NewReview) -> Result<Review> {
        let now = Utc::now();
        let created = Review {
            id: Uuid::new_v4(),
            user_id: review.user_id,
            author_name: review.author_name.clone(),
            rating: review.rating,
            content: review.content.clone(),
            status: ReviewStatus::Pending,
            is_featured: false,
            created_at: now,
            updated_at: now,
        };
        self.reviews
            .write()
            .expect("lock poisoned")
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Review>> {
        Ok(self.reviews.read().expect("lock poisoned").get(&id).cloned())
    }

    async fn latest_by_user(&self, user_id: Uuid) -> Result<Option<Review>> {
        Ok(self
            .reviews
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn list(&self, status: Option<ReviewStatus>) -> Result<Vec<Review>> {
        let reviews = self
            .reviews
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        Ok(Self::sorted_by_created(reviews))
    }

    async fn list_featured(&self) -> Result<Vec<Review>> {
        let mut reviews: Vec<Review> = self
            .reviews
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|r| r.is_featured)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(reviews)
    }

    async fn count_featured(&self) -> Result<i64> {
        Ok(self
            .reviews
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|r| r.is_featured)
            .count() as i64)
    }

    async fn update_status(&self, id: Uuid, status: ReviewStatus) -> Result<Option<Review>> {
        Ok(self.update(id, |r| {
            r.status = status;
            if status != ReviewStatus::Approved {
                r.is_featured = false;
            }
        }))
    }

    async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Option<Review>> {
        Ok(self.update(id, |r| r.is_featured = featured))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self
            .reviews
            .write()
            .expect("lock poisoned")
            .remove(&id)
            .is_some())
    }
}

// ==================== 统计 ====================

/// 预置结果的统计仓储
#[derive(Default)]
pub struct InMemoryStatsRepository {
    pub overview: DashboardOverview,
    pub revenue: Vec<MonthlyRevenue>,
    pub unpaid: Vec<UnpaidMember>,
    pub candidates: Vec<DeactivationCandidate>,
}

#[async_trait]
impl StatsRepositoryTrait for InMemoryStatsRepository {
    async fn monthly_revenue(&self, _year: i32) -> Result<Vec<MonthlyRevenue>> {
        Ok(self.revenue.clone())
    }

    async fn unpaid_members(&self, _month: NaiveDate) -> Result<Vec<UnpaidMember>> {
        Ok(self.unpaid.clone())
    }

    async fn deactivation_candidates(&self, _months: i32) -> Result<Vec<DeactivationCandidate>> {
        Ok(self.candidates.clone())
    }

    async fn overview(&self, _month_start: NaiveDate) -> Result<DashboardOverview> {
        Ok(self.overview.clone())
    }
}

// ==================== 托管认证 ====================

type TokenIssuer = Box<dyn Fn(Uuid) -> String + Send + Sync>;

/// 内存认证服务
///
/// 默认签发 `access-{user_id}` 形式的令牌，可通过 `with_token_issuer` 换成真实 JWT
pub struct FakeAuthProvider {
    accounts: RwLock<HashMap<String, (Uuid, String)>>,
    issuer: TokenIssuer,
}

impl Default for FakeAuthProvider {
    fn default() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            issuer: Box::new(|id| format!("access-{}", id)),
        }
    }
}

impl FakeAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_issuer<F>(mut self, issuer: F) -> Self
    where
        F: Fn(Uuid) -> String + Send + Sync + 'static,
    {
        self.issuer = Box::new(issuer);
        self
    }

    /// 预置一个已有账号（id 需与会员资料一致）
    pub fn register(&self, id: Uuid, email: &str, password: &str) {
        self.accounts
            .write()
            .expect("lock poisoned")
            .insert(email.to_lowercase(), (id, password.to_string()));
    }

    fn session(&self, id: Uuid, email: &str) -> AuthSession {
        AuthSession {
            access_token: (self.issuer)(id),
            refresh_token: format!("refresh-{}", id),
            expires_at: Utc::now() + Duration::hours(1),
            user: AuthUser {
                id,
                email: email.to_string(),
            },
        }
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    async fn sign_up(&self, email: &str, password: &str, _full_name: &str) -> GymResult<AuthUser> {
        let key = email.to_lowercase();
        let mut accounts = self.accounts.write().expect("lock poisoned");
        if accounts.contains_key(&key) {
            return Err(GymError::Backend {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        let id = Uuid::new_v4();
        accounts.insert(key.clone(), (id, password.to_string()));
        Ok(AuthUser { id, email: key })
    }

    async fn sign_in(&self, email: &str, password: &str) -> GymResult<AuthSession> {
        let key = email.to_lowercase();
        let account = self
            .accounts
            .read()
            .expect("lock poisoned")
            .get(&key)
            .cloned();
        match account {
            Some((id, stored)) if stored == password => Ok(self.session(id, &key)),
            _ => Err(GymError::Unauthorized("Invalid login credentials".to_string())),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> GymResult<AuthSession> {
        let id = refresh_token
            .strip_prefix("refresh-")
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| GymError::Unauthorized("Invalid Refresh Token".to_string()))?;
        let email = self
            .accounts
            .read()
            .expect("lock poisoned")
            .iter()
            .find(|(_, (account_id, _))| *account_id == id)
            .map(|(email, _)| email.clone())
            .ok_or_else(|| GymError::Unauthorized("Invalid Refresh Token".to_string()))?;
        Ok(self.session(id, &email))
    }

    async fn sign_out(&self, _access_token: &str) -> GymResult<()> {
        Ok(())
    }
}

// ==================== 对象存储 ====================

/// 内存对象存储
#[derive(Default)]
pub struct InMemoryStorage {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
    fail_removals: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, bucket: &str, path: &str) -> bool {
        self.objects
            .read()
            .expect("lock poisoned")
            .contains_key(&(bucket.to_string(), path.to_string()))
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// 让后续删除调用失败，用于验证尽力删除的路径
    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> GymResult<()> {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert((bucket.to_string(), path.to_string()), bytes);
        Ok(())
    }

    async fn remove(&self, bucket: &str, paths: Vec<String>) -> GymResult<()> {
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(GymError::Backend {
                status: 503,
                message: "storage unavailable".to_string(),
            });
        }
        let mut objects = self.objects.write().expect("lock poisoned");
        for path in paths {
            objects.remove(&(bucket.to_string(), path));
        }
        Ok(())
    }

    async fn signed_url(&self, bucket: &str, path: &str, expires_in_secs: u64) -> GymResult<String> {
        if !self.contains(bucket, path) {
            return Err(GymError::Backend {
                status: 404,
                message: "Object not found".to_string(),
            });
        }
        Ok(format!(
            "memory://sign/{}/{}?expiresIn={}",
            bucket, path, expires_in_secs
        ))
    }

    async fn list(&self, bucket: &str, prefix: &str) -> GymResult<Vec<StoredObject>> {
        let mut objects: Vec<StoredObject> = self
            .objects
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|((b, p), _)| b == bucket && p.starts_with(prefix))
            .map(|((_, p), bytes)| StoredObject {
                name: p.clone(),
                size: Some(bytes.len() as i64),
                updated_at: None,
            })
            .collect();
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://public/{}/{}", bucket, path)
    }
}
