// db/reviewdb.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{db::DBClient, StoreError};
use crate::models::reviewmodels::{RatingSummary, ReviewRecord};

/// Counts returned by a reviewer-info bulk update: how many reviews carried
/// the reviewer id, and how many actually changed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReviewerSyncOutcome {
    pub matched_count: i64,
    pub modified_count: i64,
}

#[async_trait]
pub trait ReviewRecordExt: Send + Sync {
    async fn create_review(
        &self,
        reviewer_id: Uuid,
        reviewer_name: String,
        reviewer_photo_url: Option<String>,
        target_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<ReviewRecord, StoreError>;

    async fn get_reviews_for_target(
        &self,
        target_id: Uuid,
    ) -> Result<Vec<ReviewRecord>, StoreError>;

    /// Average rating and review count for one worker, unrounded.
    async fn rating_summary(&self, target_id: Uuid) -> Result<RatingSummary, StoreError>;

    /// Rewrites the denormalized reviewer snapshot on every review with this
    /// reviewer id. `None` fields are left as they are.
    async fn bulk_update_reviewer_info(
        &self,
        reviewer_id: Uuid,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<ReviewerSyncOutcome, StoreError>;
}

#[async_trait]
impl ReviewRecordExt for DBClient {
    async fn create_review(
        &self,
        reviewer_id: Uuid,
        reviewer_name: String,
        reviewer_photo_url: Option<String>,
        target_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<ReviewRecord, StoreError> {
        let review = sqlx::query_as::<_, ReviewRecord>(
            r#"
            INSERT INTO review_records
                (reviewer_id, reviewer_name, reviewer_photo_url, target_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id, reviewer_id, reviewer_name, reviewer_photo_url, target_id,
                rating, comment, edited, created_at, updated_at
            "#,
        )
        .bind(reviewer_id)
        .bind(reviewer_name)
        .bind(reviewer_photo_url)
        .bind(target_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    async fn get_reviews_for_target(
        &self,
        target_id: Uuid,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        let reviews = sqlx::query_as::<_, ReviewRecord>(
            r#"
            SELECT
                id, reviewer_id, reviewer_name, reviewer_photo_url, target_id,
                rating, comment, edited, created_at, updated_at
            FROM review_records
            WHERE target_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(target_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn rating_summary(&self, target_id: Uuid) -> Result<RatingSummary, StoreError> {
        let (avg, count): (Option<f64>, i64) = sqlx::query_as(
            r#"
            SELECT AVG(rating::float8), COUNT(*)
            FROM review_records
            WHERE target_id = $1
            "#,
        )
        .bind(target_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(RatingSummary {
            rating: avg.unwrap_or(0.0),
            review_count: count,
        })
    }

    async fn bulk_update_reviewer_info(
        &self,
        reviewer_id: Uuid,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<ReviewerSyncOutcome, StoreError> {
        let (matched_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM review_records WHERE reviewer_id = $1")
                .bind(reviewer_id)
                .fetch_one(&self.pool)
                .await?;

        let result = sqlx::query(
            r#"
            UPDATE review_records
            SET reviewer_name = COALESCE($1, reviewer_name),
                reviewer_photo_url = COALESCE($2, reviewer_photo_url),
                updated_at = NOW()
            WHERE reviewer_id = $3
            "#,
        )
        .bind(display_name)
        .bind(photo_url)
        .bind(reviewer_id)
        .execute(&self.pool)
        .await?;

        Ok(ReviewerSyncOutcome {
            matched_count,
            modified_count: result.rows_affected() as i64,
        })
    }
}
