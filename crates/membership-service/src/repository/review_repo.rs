//! 评价仓储

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::ReviewRepositoryTrait;
use crate::error::Result;
use crate::models::{NewReview, Review, ReviewStatus};

const REVIEW_COLUMNS: &str = "id, user_id, author_name, rating::int4 AS rating, content, \
                              status::varchar AS status, is_featured, created_at, updated_at";

/// 评价仓储（`reviews` 表）
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepositoryTrait for ReviewRepository {
    async fn create(&self, review: &NewReview) -> Result<Review> {
        let created = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (id, user_id, author_name, rating, content, status,
                                 is_featured, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'pending', false, NOW(), NOW())
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(review.user_id)
        .bind(&review.author_name)
        .bind(review.rating)
        .bind(&review.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn latest_by_user(&self, user_id: Uuid) -> Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {}
            FROM reviews
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            REVIEW_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn list(&self, status: Option<ReviewStatus>) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {}
            FROM reviews
            WHERE ($1::varchar IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
            REVIEW_COLUMNS
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn list_featured(&self) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {}
            FROM reviews
            WHERE is_featured = true
            ORDER BY updated_at DESC
            "#,
            REVIEW_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn count_featured(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE is_featured = true")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn update_status(&self, id: Uuid, status: ReviewStatus) -> Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews
            SET status = $2,
                is_featured = CASE WHEN $2 = 'approved' THEN is_featured ELSE false END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews
            SET is_featured = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(id)
        .bind(featured)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
