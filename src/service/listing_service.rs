// service/listing_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::directory::Directory,
    dtos::workerdtos::EnrichedWorkerDto,
    models::{reviewmodels::RatingSummary, workermodel::WorkerProfile},
    service::error::ServiceError,
};

/// Read side: worker profiles joined with rating aggregates from the review
/// store. The review store is a collaborator; when it is unreachable the
/// listing still answers, with zeroed aggregates.
#[derive(Clone)]
pub struct ListingService {
    directory: Arc<Directory>,
}

pub fn round_rating(raw: f64) -> f64 {
    (raw * 10.0).round() / 10.0
}

impl ListingService {
    pub fn new(directory: Arc<Directory>) -> Self {
        Self { directory }
    }

    pub async fn get_all_workers(&self) -> Result<Vec<EnrichedWorkerDto>, ServiceError> {
        let workers = self.directory.workers.get_all_worker_profiles().await?;

        let mut enriched = Vec::with_capacity(workers.len());
        for worker in workers {
            enriched.push(self.enrich(worker).await);
        }

        Ok(enriched)
    }

    pub async fn get_worker_by_id(
        &self,
        worker_id: Uuid,
    ) -> Result<EnrichedWorkerDto, ServiceError> {
        let worker = self
            .directory
            .workers
            .get_worker_profile(worker_id)
            .await?
            .ok_or(ServiceError::WorkerNotFound(worker_id))?;

        Ok(self.enrich(worker).await)
    }

    async fn enrich(&self, worker: WorkerProfile) -> EnrichedWorkerDto {
        let summary = match self.directory.reviews.rating_summary(worker.id).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(
                    worker_id = %worker.id,
                    "review store unreachable, degrading listing aggregates to zero: {}",
                    e
                );
                RatingSummary::empty()
            }
        };

        EnrichedWorkerDto::from_profile(
            worker,
            round_rating(summary.rating),
            summary.review_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::{models::workermodel::WorkerStatus, service::testsupport::TestHarness};

    #[test]
    fn rating_rounds_to_one_decimal() {
        assert_eq!(round_rating(13.0 / 3.0), 4.3);
        assert_eq!(round_rating(0.0), 0.0);
        assert_eq!(round_rating(4.25), 4.3);
        assert_eq!(round_rating(4.94), 4.9);
        assert_eq!(round_rating(5.0), 5.0);
    }

    #[tokio::test]
    async fn listing_carries_rating_aggregates() {
        let harness = TestHarness::new();
        let worker = harness.seed_worker(WorkerStatus::Approved);
        for rating in [5, 4, 4] {
            harness.reviews.seed_review(Uuid::new_v4(), worker.id, rating);
        }
        let svc = ListingService::new(harness.directory.clone());

        let enriched = svc.get_worker_by_id(worker.id).await.unwrap();

        assert_eq!(enriched.rating, 4.3);
        assert_eq!(enriched.review_count, 3);
    }

    #[tokio::test]
    async fn worker_without_reviews_reads_as_zero() {
        let harness = TestHarness::new();
        let worker = harness.seed_worker(WorkerStatus::Approved);
        let svc = ListingService::new(harness.directory.clone());

        let enriched = svc.get_worker_by_id(worker.id).await.unwrap();

        assert_eq!(enriched.rating, 0.0);
        assert_eq!(enriched.review_count, 0);
    }

    #[tokio::test]
    async fn review_store_outage_degrades_to_zero_instead_of_failing() {
        let harness = TestHarness::new();
        let worker = harness.seed_worker(WorkerStatus::Approved);
        harness.reviews.seed_review(Uuid::new_v4(), worker.id, 5);
        harness.reviews.set_down(true);
        let svc = ListingService::new(harness.directory.clone());

        let listed = svc.get_all_workers().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].rating, 0.0);
        assert_eq!(listed[0].review_count, 0);
    }

    #[tokio::test]
    async fn unknown_worker_is_not_found() {
        let harness = TestHarness::new();
        let svc = ListingService::new(harness.directory.clone());

        let err = svc.get_worker_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::WorkerNotFound(_)));
    }
}
