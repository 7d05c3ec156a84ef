//! 评价服务
//!
//! 会员提交评价（每 3 个月一次），管理员审核后可精选到首页，精选最多 10 条。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gym_shared::observability::metrics;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{MembershipError, Result};
use crate::models::{
    FEATURED_REVIEW_LIMIT, NewReview, Review, ReviewEligibility, ReviewStatus, review_eligibility,
};
use crate::repository::{MemberRepositoryTrait, ReviewRepositoryTrait};
use crate::service::dto::SubmitReviewInput;

/// 评价服务
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepositoryTrait>,
    members: Arc<dyn MemberRepositoryTrait>,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewRepositoryTrait>,
        members: Arc<dyn MemberRepositoryTrait>,
    ) -> Self {
        Self { reviews, members }
    }

    /// 评价提交资格
    pub async fn eligibility(&self, user_id: Uuid) -> Result<ReviewEligibility> {
        self.eligibility_at(user_id, Utc::now()).await
    }

    async fn eligibility_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<ReviewEligibility> {
        let last = self.reviews.latest_by_user(user_id).await?;
        Ok(review_eligibility(last.map(|r| r.created_at), now))
    }

    /// 提交评价，新评价进入待审核状态
    #[instrument(skip(self, input))]
    pub async fn submit_review(&self, user_id: Uuid, input: SubmitReviewInput) -> Result<Review> {
        self.submit_review_at(user_id, input, Utc::now()).await
    }

    async fn submit_review_at(
        &self,
        user_id: Uuid,
        input: SubmitReviewInput,
        now: DateTime<Utc>,
    ) -> Result<Review> {
        if let Err(e) = input.validate() {
            metrics::record_review_submission("invalid");
            return Err(e.into());
        }

        let member = self
            .members
            .get(user_id)
            .await?
            .ok_or(MembershipError::MemberNotFound(user_id))?;

        let eligibility = self.eligibility_at(user_id, now).await?;
        if !eligibility.can_submit {
            metrics::record_review_submission("too_soon");
            return Err(MembershipError::ReviewTooSoon {
                next_eligible_at: eligibility.next_eligible_at.unwrap_or(now),
            });
        }

        let review = self
            .reviews
            .create(&NewReview {
                user_id,
                author_name: member.full_name,
                rating: input.rating,
                content: input.content.trim().to_string(),
            })
            .await?;

        metrics::record_review_submission("success");
        info!(review_id = %review.id, rating = review.rating, "评价已提交");
        Ok(review)
    }

    /// 首页精选评价
    pub async fn featured_reviews(&self) -> Result<Vec<Review>> {
        self.reviews.list_featured().await
    }

    /// 已审核通过的评价
    pub async fn approved_reviews(&self) -> Result<Vec<Review>> {
        self.reviews.list(Some(ReviewStatus::Approved)).await
    }

    /// 后台评价列表
    pub async fn list_reviews(&self, status: Option<ReviewStatus>) -> Result<Vec<Review>> {
        self.reviews.list(status).await
    }

    #[instrument(skip(self))]
    pub async fn approve(&self, review_id: Uuid) -> Result<Review> {
        let review = self
            .reviews
            .update_status(review_id, ReviewStatus::Approved)
            .await?
            .ok_or(MembershipError::ReviewNotFound(review_id))?;
        info!(review_id = %review_id, "评价审核通过");
        Ok(review)
    }

    /// 驳回评价，同时取消精选
    #[instrument(skip(self))]
    pub async fn reject(&self, review_id: Uuid) -> Result<Review> {
        let review = self
            .reviews
            .update_status(review_id, ReviewStatus::Rejected)
            .await?
            .ok_or(MembershipError::ReviewNotFound(review_id))?;
        info!(review_id = %review_id, "评价已驳回");
        Ok(review)
    }

    /// 精选评价
    ///
    /// 只有审核通过的评价可以精选；已满 10 条时返回当前精选列表
    #[instrument(skip(self))]
    pub async fn feature(&self, review_id: Uuid) -> Result<Review> {
        let review = self
            .reviews
            .get(review_id)
            .await?
            .ok_or(MembershipError::ReviewNotFound(review_id))?;

        if review.status != ReviewStatus::Approved {
            return Err(MembershipError::InvalidReviewStatus {
                review_id,
                current_status: review.status.to_string(),
            });
        }
        if review.is_featured {
            return Ok(review);
        }

        let count = self.reviews.count_featured().await?;
        if count >= FEATURED_REVIEW_LIMIT as i64 {
            let featured = self.reviews.list_featured().await?;
            warn!(count, "精选评价已达上限");
            return Err(MembershipError::FeaturedLimitReached {
                limit: FEATURED_REVIEW_LIMIT,
                featured,
            });
        }

        let review = self
            .reviews
            .set_featured(review_id, true)
            .await?
            .ok_or(MembershipError::ReviewNotFound(review_id))?;
        info!(review_id = %review_id, "评价已精选");
        Ok(review)
    }

    #[instrument(skip(self))]
    pub async fn unfeature(&self, review_id: Uuid) -> Result<Review> {
        self.reviews
            .set_featured(review_id, false)
            .await?
            .ok_or(MembershipError::ReviewNotFound(review_id))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, review_id: Uuid) -> Result<()> {
        if !self.reviews.delete(review_id).await? {
            return Err(MembershipError::ReviewNotFound(review_id));
        }
        info!(review_id = %review_id, "评价已删除");
        Ok(())
    }
}
