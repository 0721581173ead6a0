// db/verificationdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    db::{is_unique_violation, DBClient},
    StoreError,
};
use crate::models::verificationmodels::{RequestSnapshot, RequestStatus, VerificationRequest};

/// Surface of the verification request store: one review task per
/// submission or resubmission, at most one pending per worker.
#[async_trait]
pub trait VerificationRequestExt: Send + Sync {
    /// Persists a new pending request from a profile snapshot. Fails with
    /// [`StoreError::DuplicatePending`] when the worker already has a pending
    /// request, including when a concurrent racer inserted one between any
    /// caller-side check and this insert.
    async fn create_verification_request(
        &self,
        snapshot: RequestSnapshot,
    ) -> Result<VerificationRequest, StoreError>;

    async fn get_verification_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<VerificationRequest>, StoreError>;

    async fn list_verification_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<VerificationRequest>, StoreError>;

    async fn count_pending_for_worker(&self, worker_id: Uuid) -> Result<i64, StoreError>;

    /// Requests created for this worker strictly after `since`, any status.
    /// Feeds the 24h resubmission window.
    async fn count_requests_since(
        &self,
        worker_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    async fn delete_pending_for_worker(&self, worker_id: Uuid) -> Result<u64, StoreError>;

    /// Applies a verdict to a still-pending request. Returns `None` when the
    /// request is already terminal (or gone), leaving it untouched.
    async fn mark_decided(
        &self,
        request_id: Uuid,
        verdict: RequestStatus,
        notes: Option<String>,
    ) -> Result<Option<VerificationRequest>, StoreError>;

    async fn delete_verification_request(&self, request_id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
impl VerificationRequestExt for DBClient {
    async fn create_verification_request(
        &self,
        snapshot: RequestSnapshot,
    ) -> Result<VerificationRequest, StoreError> {
        let result = sqlx::query_as::<_, VerificationRequest>(
            r#"
            INSERT INTO verification_requests
                (worker_id, worker_name, category, document_url, document_id, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING
                id, worker_id, worker_name, category, document_url, document_id,
                status, review_notes, request_date, review_date
            "#,
        )
        .bind(snapshot.worker_id)
        .bind(snapshot.worker_name)
        .bind(snapshot.category)
        .bind(snapshot.document_url)
        .bind(snapshot.document_id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(request) => Ok(request),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::DuplicatePending(snapshot.worker_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_verification_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<VerificationRequest>, StoreError> {
        let request = sqlx::query_as::<_, VerificationRequest>(
            r#"
            SELECT
                id, worker_id, worker_name, category, document_url, document_id,
                status, review_notes, request_date, review_date
            FROM verification_requests
            WHERE id = $1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn list_verification_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<VerificationRequest>, StoreError> {
        let requests = match status {
            Some(status) => {
                sqlx::query_as::<_, VerificationRequest>(
                    r#"
                    SELECT
                        id, worker_id, worker_name, category, document_url, document_id,
                        status, review_notes, request_date, review_date
                    FROM verification_requests
                    WHERE status = $1
                    ORDER BY request_date ASC
                    "#,
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, VerificationRequest>(
                    r#"
                    SELECT
                        id, worker_id, worker_name, category, document_url, document_id,
                        status, review_notes, request_date, review_date
                    FROM verification_requests
                    ORDER BY request_date ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(requests)
    }

    async fn count_pending_for_worker(&self, worker_id: Uuid) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM verification_requests
            WHERE worker_id = $1 AND status = 'pending'
            "#,
        )
        .bind(worker_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_requests_since(
        &self,
        worker_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM verification_requests
            WHERE worker_id = $1 AND request_date > $2
            "#,
        )
        .bind(worker_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn delete_pending_for_worker(&self, worker_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM verification_requests
            WHERE worker_id = $1 AND status = 'pending'
            "#,
        )
        .bind(worker_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn mark_decided(
        &self,
        request_id: Uuid,
        verdict: RequestStatus,
        notes: Option<String>,
    ) -> Result<Option<VerificationRequest>, StoreError> {
        // The status guard in the WHERE clause makes pending -> terminal the
        // only transition this store will perform.
        let request = sqlx::query_as::<_, VerificationRequest>(
            r#"
            UPDATE verification_requests
            SET status = $1, review_notes = $2, review_date = NOW()
            WHERE id = $3 AND status = 'pending'
            RETURNING
                id, worker_id, worker_name, category, document_url, document_id,
                status, review_notes, request_date, review_date
            "#,
        )
        .bind(verdict)
        .bind(notes)
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn delete_verification_request(&self, request_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM verification_requests WHERE id = $1")
            .bind(request_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}
