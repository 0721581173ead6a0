// service/submission_service.rs
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    db::{directory::Directory, workerdb::WorkerFieldPatch, StoreError},
    dtos::workerdtos::PatchWorkerDto,
    models::{
        outboxmodels::PropagationIntent,
        verificationmodels::{RequestSnapshot, VerificationRequest},
        workermodel::{WorkerProfile, WorkerStatus},
    },
    service::{error::ServiceError, outbox::Propagator},
};

/// Sliding window over request-creation timestamps. The boundary is
/// exclusive: a request exactly 24 hours old has aged out. Admin decisions
/// never reset the window.
pub const RESUBMISSION_WINDOW_HOURS: i64 = 24;
/// Requests allowed inside the window before a resubmission is refused.
pub const RESUBMISSION_MAX_IN_WINDOW: i64 = 2;

/// Owns submission and resubmission: document upload, the
/// one-pending-request-per-worker invariant and the 24h rate limit.
#[derive(Clone)]
pub struct SubmissionService {
    directory: Arc<Directory>,
    propagator: Propagator,
}

impl SubmissionService {
    pub fn new(directory: Arc<Directory>, propagator: Propagator) -> Self {
        Self {
            directory,
            propagator,
        }
    }

    /// Opens a verification request for a worker's submitted credentials.
    /// Invoked once at registration and again via [`Self::patch_worker`] at
    /// each resubmission.
    pub async fn submit(
        &self,
        worker_id: Uuid,
        document_id: String,
        document_file_name: String,
        document_base64: String,
    ) -> Result<VerificationRequest, ServiceError> {
        let worker = self
            .directory
            .workers
            .get_worker_profile(worker_id)
            .await?
            .ok_or(ServiceError::WorkerNotFound(worker_id))?;

        self.check_resubmission_window(worker_id).await?;

        if self.directory.requests.count_pending_for_worker(worker_id).await? > 0 {
            return Err(ServiceError::DuplicatePending(worker_id));
        }

        // Upload before any database write; a crash after the upload leaves
        // an orphaned object, never a half-written state machine.
        let stored = self
            .directory
            .documents
            .upload_document(&document_file_name, &document_base64)
            .await?;

        let worker = self
            .directory
            .workers
            .update_worker_fields(
                worker_id,
                WorkerFieldPatch {
                    document_url: Some(stored.url.clone()),
                    document_id: Some(document_id.clone()),
                    ..Default::default()
                },
            )
            .await?;

        let snapshot = RequestSnapshot {
            worker_id,
            worker_name: worker.name.clone(),
            category: worker.category.clone(),
            document_url: stored.url,
            document_id,
        };

        // The pending-count check above can race a concurrent submit; the
        // storage-level uniqueness on pending requests settles it.
        let request = self
            .directory
            .requests
            .create_verification_request(snapshot)
            .await?;

        tracing::info!(worker_id = %worker_id, request_id = %request.id, "verification request opened");

        Ok(request)
    }

    /// Worker profile edit. A new identity document makes it a resubmission:
    /// the profile falls back to pending and a fresh verification request is
    /// opened, subject to the 24h rate limit. Name/photo changes fan out to
    /// the denormalized reviewer snapshots.
    pub async fn patch_worker(
        &self,
        worker_id: Uuid,
        dto: PatchWorkerDto,
    ) -> Result<WorkerProfile, ServiceError> {
        let existing = self
            .directory
            .workers
            .get_worker_profile(worker_id)
            .await?
            .ok_or(ServiceError::WorkerNotFound(worker_id))?;

        if dto.has_new_document() {
            return self.resubmit(existing, dto).await;
        }

        let patch = WorkerFieldPatch {
            name: dto.name.clone(),
            photo_url: dto.photo_url.clone(),
            category: dto.category.clone(),
            ..Default::default()
        };

        if patch.is_empty() {
            return Err(ServiceError::Validation(
                "No profile fields provided".to_string(),
            ));
        }

        let updated = self
            .directory
            .workers
            .update_worker_fields(worker_id, patch)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::WorkerNotFound(worker_id),
                other => other.into(),
            })?;

        self.sync_reviewer_snapshot(&existing, &updated).await;

        Ok(updated)
    }

    /// Admin-only status push into the worker profile store, used by decision
    /// propagation. Idempotent.
    pub async fn set_worker_status(
        &self,
        worker_id: Uuid,
        status: WorkerStatus,
    ) -> Result<WorkerProfile, ServiceError> {
        self.directory
            .workers
            .set_worker_status(worker_id, status)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::WorkerNotFound(worker_id),
                other => other.into(),
            })?;

        self.directory
            .workers
            .get_worker_profile(worker_id)
            .await?
            .ok_or(ServiceError::WorkerNotFound(worker_id))
    }

    async fn resubmit(
        &self,
        existing: WorkerProfile,
        dto: PatchWorkerDto,
    ) -> Result<WorkerProfile, ServiceError> {
        let worker_id = existing.id;

        // Refuse before any document, status or request mutation happens.
        self.check_resubmission_window(worker_id).await?;

        let document_base64 = dto.document_base64.as_deref().unwrap_or_default();
        let file_name = dto
            .document_file_name
            .clone()
            .unwrap_or_else(|| "identity-document".to_string());
        let document_id = dto.document_id.clone().unwrap_or_default();
        if document_id.is_empty() {
            return Err(ServiceError::Validation(
                "A document id must accompany a new identity document".to_string(),
            ));
        }

        let stored = self
            .directory
            .documents
            .upload_document(&file_name, document_base64)
            .await?;

        // Local profile commit: new document refs and back to pending.
        let updated = self
            .directory
            .workers
            .update_worker_fields(
                worker_id,
                WorkerFieldPatch {
                    name: dto.name.clone(),
                    photo_url: dto.photo_url.clone(),
                    category: dto.category.clone(),
                    document_url: Some(stored.url.clone()),
                    document_id: Some(document_id.clone()),
                },
            )
            .await?;
        self.directory
            .workers
            .set_worker_status(worker_id, WorkerStatus::Pending)
            .await?;

        self.sync_reviewer_snapshot(&existing, &updated).await;

        let snapshot = RequestSnapshot {
            worker_id,
            worker_name: updated.name.clone(),
            category: updated.category.clone(),
            document_url: stored.url,
            document_id,
        };

        // Downstream request-store calls. The profile write above is already
        // committed and is not rolled back on failure; the outbox intent
        // keeps delivery at-least-once so the pending profile reconciles.
        match self.reset_requests(&snapshot).await {
            Ok(request_id) => {
                tracing::info!(
                    worker_id = %worker_id,
                    request_id = %request_id,
                    "resubmission opened a fresh verification request"
                );
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(
                    worker_id = %worker_id,
                    "request store unavailable after profile commit, queuing intent: {}",
                    e
                );
                self.propagator
                    .record_and_deliver(PropagationIntent::ResubmitRequest { snapshot })
                    .await;
            }
            Err(StoreError::DuplicatePending(_)) => {
                // A concurrent resubmission won the create; one pending
                // request exists, which is exactly the invariant.
                tracing::warn!(worker_id = %worker_id, "concurrent resubmission already opened a pending request");
            }
            Err(e) => return Err(e.into()),
        }

        let mut updated = updated;
        updated.status = WorkerStatus::Pending;
        Ok(updated)
    }

    async fn reset_requests(&self, snapshot: &RequestSnapshot) -> Result<Uuid, StoreError> {
        self.directory
            .requests
            .delete_pending_for_worker(snapshot.worker_id)
            .await?;

        let request = self
            .directory
            .requests
            .create_verification_request(snapshot.clone())
            .await?;

        Ok(request.id)
    }

    async fn check_resubmission_window(&self, worker_id: Uuid) -> Result<(), ServiceError> {
        let since = Utc::now() - Duration::hours(RESUBMISSION_WINDOW_HOURS);
        let recent = self
            .directory
            .requests
            .count_requests_since(worker_id, since)
            .await?;

        if recent >= RESUBMISSION_MAX_IN_WINDOW {
            return Err(ServiceError::RateLimited(worker_id));
        }

        Ok(())
    }

    /// Fire-and-forget reviewer-snapshot refresh when identity fields moved.
    async fn sync_reviewer_snapshot(&self, before: &WorkerProfile, after: &WorkerProfile) {
        let name_changed = before.name != after.name;
        let photo_changed = before.photo_url != after.photo_url;
        if !name_changed && !photo_changed {
            return;
        }

        self.propagator
            .record_and_deliver(PropagationIntent::ReviewerInfo {
                reviewer_id: after.user_id,
                display_name: name_changed.then(|| after.name.clone()),
                photo_url: if photo_changed {
                    after.photo_url.clone()
                } else {
                    None
                },
            })
            .await;
    }
}
