// service/reviewer_sync_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{directory::Directory, reviewdb::ReviewerSyncOutcome},
    models::reviewmodels::ReviewRecord,
    service::error::ServiceError,
};

/// Keeps the denormalized reviewer name/photo on review records in step with
/// identity changes. Write-path sync: review reads never join the identity
/// service.
#[derive(Clone)]
pub struct ReviewerSyncService {
    directory: Arc<Directory>,
}

impl ReviewerSyncService {
    pub fn new(directory: Arc<Directory>) -> Self {
        Self { directory }
    }

    pub async fn create_review(
        &self,
        reviewer_id: Uuid,
        reviewer_name: String,
        reviewer_photo_url: Option<String>,
        target_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<ReviewRecord, ServiceError> {
        let review = self
            .directory
            .reviews
            .create_review(
                reviewer_id,
                reviewer_name,
                reviewer_photo_url,
                target_id,
                rating,
                comment,
            )
            .await?;

        Ok(review)
    }

    pub async fn reviews_for_worker(
        &self,
        target_id: Uuid,
    ) -> Result<Vec<ReviewRecord>, ServiceError> {
        Ok(self.directory.reviews.get_reviews_for_target(target_id).await?)
    }

    /// Synchronous bulk refresh, used by the identity collaborator's own
    /// call-in. Errors surface to the caller.
    pub async fn bulk_update_reviewer_info(
        &self,
        reviewer_id: Uuid,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<ReviewerSyncOutcome, ServiceError> {
        if display_name.is_none() && photo_url.is_none() {
            return Err(ServiceError::Validation(
                "Nothing to update: provide a display name or a photo".to_string(),
            ));
        }

        let outcome = self
            .directory
            .reviews
            .bulk_update_reviewer_info(reviewer_id, display_name, photo_url)
            .await?;

        tracing::info!(
            reviewer_id = %reviewer_id,
            matched = outcome.matched_count,
            modified = outcome.modified_count,
            "reviewer snapshots updated"
        );

        Ok(outcome)
    }

}
