// service/decision_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{directory::Directory, StoreError},
    models::{
        outboxmodels::PropagationIntent,
        verificationmodels::{RequestStatus, VerificationRequest},
        workermodel::WorkerStatus,
    },
    service::{error::ServiceError, outbox::Propagator},
};

/// Applies admin verdicts to verification requests and propagates the
/// outcome into the worker profile store.
#[derive(Clone)]
pub struct DecisionService {
    directory: Arc<Directory>,
    propagator: Propagator,
}

impl DecisionService {
    pub fn new(directory: Arc<Directory>, propagator: Propagator) -> Self {
        Self {
            directory,
            propagator,
        }
    }

    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<VerificationRequest>, ServiceError> {
        Ok(self.directory.requests.list_verification_requests(status).await?)
    }

    pub async fn get_request(&self, request_id: Uuid) -> Result<VerificationRequest, ServiceError> {
        self.directory
            .requests
            .get_verification_request(request_id)
            .await?
            .ok_or(ServiceError::RequestNotFound(request_id))
    }

    /// `pending -> verified` or `pending -> rejected`, both terminal. The
    /// worker-status push is recorded durably and delivered at least once;
    /// it never fails the decision itself.
    pub async fn decide(
        &self,
        request_id: Uuid,
        verdict: RequestStatus,
        notes: Option<String>,
    ) -> Result<VerificationRequest, ServiceError> {
        if !verdict.is_terminal() {
            return Err(ServiceError::Validation(
                "A decision must be verified or rejected".to_string(),
            ));
        }

        let trimmed_notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        if verdict == RequestStatus::Rejected && trimmed_notes.is_none() {
            return Err(ServiceError::Validation(
                "Rejecting a request requires review notes".to_string(),
            ));
        }

        let decided = self
            .directory
            .requests
            .mark_decided(request_id, verdict, trimmed_notes)
            .await?;

        let request = match decided {
            Some(request) => request,
            // The guarded update touched nothing: either the id is unknown or
            // the request is already terminal.
            None => {
                return match self
                    .directory
                    .requests
                    .get_verification_request(request_id)
                    .await?
                {
                    Some(existing) => {
                        Err(ServiceError::RequestAlreadyDecided(request_id, existing.status))
                    }
                    None => Err(ServiceError::RequestNotFound(request_id)),
                };
            }
        };

        let worker_status = match verdict {
            RequestStatus::Verified => WorkerStatus::Approved,
            _ => WorkerStatus::Rejected,
        };

        self.propagator
            .record_and_deliver(PropagationIntent::WorkerStatus {
                worker_id: request.worker_id,
                status: worker_status,
            })
            .await;

        tracing::info!(
            request_id = %request.id,
            worker_id = %request.worker_id,
            verdict = verdict.to_str(),
            "verification request decided"
        );

        Ok(request)
    }

    /// Operator hard delete. Leaves the associated worker's status untouched.
    pub async fn delete_request(&self, request_id: Uuid) -> Result<(), ServiceError> {
        self.directory
            .requests
            .delete_verification_request(request_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::RequestNotFound(request_id),
                other => other.into(),
            })
    }
}
