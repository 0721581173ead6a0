// db/workerdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::{db::DBClient, StoreError};
use crate::models::workermodel::{WorkerProfile, WorkerStatus};

/// Fields a worker may change on their own profile. A new identity document
/// is what makes an edit a resubmission.
#[derive(Debug, Clone, Default)]
pub struct WorkerFieldPatch {
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub category: Option<String>,
    pub document_url: Option<String>,
    pub document_id: Option<String>,
}

impl WorkerFieldPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.photo_url.is_none()
            && self.category.is_none()
            && self.document_url.is_none()
            && self.document_id.is_none()
    }
}

/// Write/read surface of the worker profile store. Mutated by the worker's
/// own edits or by status pushes propagated from decisions; never joined
/// transactionally with the other stores.
#[async_trait]
pub trait WorkerProfileExt: Send + Sync {
    async fn create_worker_profile(
        &self,
        user_id: Uuid,
        name: String,
        email: String,
        category: String,
    ) -> Result<WorkerProfile, StoreError>;

    async fn get_worker_profile(&self, worker_id: Uuid)
        -> Result<Option<WorkerProfile>, StoreError>;

    async fn get_all_worker_profiles(&self) -> Result<Vec<WorkerProfile>, StoreError>;

    async fn update_worker_fields(
        &self,
        worker_id: Uuid,
        patch: WorkerFieldPatch,
    ) -> Result<WorkerProfile, StoreError>;

    /// Idempotent: setting a status the profile already has is a no-op,
    /// so retried propagation deliveries are safe.
    async fn set_worker_status(
        &self,
        worker_id: Uuid,
        status: WorkerStatus,
    ) -> Result<(), StoreError>;

    async fn delete_worker_profile(&self, worker_id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
impl WorkerProfileExt for DBClient {
    async fn create_worker_profile(
        &self,
        user_id: Uuid,
        name: String,
        email: String,
        category: String,
    ) -> Result<WorkerProfile, StoreError> {
        let worker = sqlx::query_as::<_, WorkerProfile>(
            r#"
            INSERT INTO worker_profiles (user_id, name, email, category, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, user_id, name, email, photo_url, category,
                      document_url, document_id, status, joined_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok(worker)
    }

    async fn get_worker_profile(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<WorkerProfile>, StoreError> {
        let worker = sqlx::query_as::<_, WorkerProfile>(
            r#"
            SELECT id, user_id, name, email, photo_url, category,
                   document_url, document_id, status, joined_at, updated_at
            FROM worker_profiles
            WHERE id = $1
            "#,
        )
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(worker)
    }

    async fn get_all_worker_profiles(&self) -> Result<Vec<WorkerProfile>, StoreError> {
        let workers = sqlx::query_as::<_, WorkerProfile>(
            r#"
            SELECT id, user_id, name, email, photo_url, category,
                   document_url, document_id, status, joined_at, updated_at
            FROM worker_profiles
            ORDER BY joined_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(workers)
    }

    async fn update_worker_fields(
        &self,
        worker_id: Uuid,
        patch: WorkerFieldPatch,
    ) -> Result<WorkerProfile, StoreError> {
        let worker = sqlx::query_as::<_, WorkerProfile>(
            r#"
            UPDATE worker_profiles
            SET name = COALESCE($1, name),
                photo_url = COALESCE($2, photo_url),
                category = COALESCE($3, category),
                document_url = COALESCE($4, document_url),
                document_id = COALESCE($5, document_id),
                updated_at = NOW()
            WHERE id = $6
            RETURNING id, user_id, name, email, photo_url, category,
                      document_url, document_id, status, joined_at, updated_at
            "#,
        )
        .bind(patch.name)
        .bind(patch.photo_url)
        .bind(patch.category)
        .bind(patch.document_url)
        .bind(patch.document_id)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(worker)
    }

    async fn set_worker_status(
        &self,
        worker_id: Uuid,
        status: WorkerStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE worker_profiles
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(status)
        .bind(worker_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn delete_worker_profile(&self, worker_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM worker_profiles WHERE id = $1")
            .bind(worker_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}
