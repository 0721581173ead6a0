// service/outbox.rs
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::time::interval;

use crate::{
    db::{directory::Directory, StoreError},
    models::outboxmodels::{OutboxEntry, PropagationIntent},
};

/// Cap between retries once the exponential backoff has grown.
const MAX_BACKOFF_SECS: i64 = 300;
const BASE_BACKOFF_SECS: i64 = 5;
const DRAIN_BATCH_SIZE: i64 = 20;

pub fn backoff_delay(attempts: i32) -> Duration {
    let exp = attempts.clamp(0, 16) as u32;
    let secs = BASE_BACKOFF_SECS.saturating_mul(1i64 << exp);
    Duration::seconds(secs.min(MAX_BACKOFF_SECS))
}

/// Delivers cross-store writes with at-least-once semantics: every intent is
/// durably recorded before delivery is attempted, and unacknowledged intents
/// are retried by the background worker with exponential backoff.
#[derive(Clone)]
pub struct Propagator {
    directory: Arc<Directory>,
}

impl Propagator {
    pub fn new(directory: Arc<Directory>) -> Self {
        Self { directory }
    }

    /// Durably records the intent, then tries to deliver it right away so the
    /// common case converges without waiting for the worker. Never fails the
    /// caller: the triggering request has already committed its own write.
    pub async fn record_and_deliver(&self, intent: PropagationIntent) {
        let entry = match self.directory.outbox.enqueue_intent(&intent).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(
                    kind = intent.kind(),
                    "failed to record propagation intent, attempting direct delivery: {}",
                    e
                );
                None
            }
        };

        match self.apply(&intent).await {
            Ok(()) => {
                if let Some(entry) = entry {
                    if let Err(e) = self.directory.outbox.mark_acked(entry.id).await {
                        tracing::warn!(entry_id = %entry.id, "failed to ack outbox entry: {}", e);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    kind = intent.kind(),
                    "propagation delivery failed, retry worker will reattempt: {}",
                    e
                );
                if let Some(entry) = entry {
                    self.record_failure(&entry, &e).await;
                }
            }
        }
    }

    /// One pass over due entries. Returns how many were acknowledged.
    pub async fn drain_due(&self) -> Result<usize, StoreError> {
        let entries = self.directory.outbox.due_entries(DRAIN_BATCH_SIZE).await?;
        let mut acked = 0;

        for entry in entries {
            let intent = match entry.intent() {
                Ok(intent) => intent,
                Err(e) => {
                    // Undecodable payloads would retry forever; park them with
                    // the error recorded for an operator.
                    tracing::error!(entry_id = %entry.id, "unreadable outbox payload: {}", e);
                    let far_future = Utc::now() + Duration::days(3650);
                    self.directory
                        .outbox
                        .mark_failed(entry.id, &format!("payload decode: {}", e), far_future)
                        .await?;
                    continue;
                }
            };

            match self.apply(&intent).await {
                Ok(()) => {
                    self.directory.outbox.mark_acked(entry.id).await?;
                    acked += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        entry_id = %entry.id,
                        kind = entry.kind.as_str(),
                        attempts = entry.attempts,
                        "outbox delivery failed: {}",
                        e
                    );
                    self.record_failure(&entry, &e).await;
                }
            }
        }

        Ok(acked)
    }

    async fn record_failure(&self, entry: &OutboxEntry, error: &StoreError) {
        let next_attempt_at = Utc::now() + backoff_delay(entry.attempts + 1);
        if let Err(e) = self
            .directory
            .outbox
            .mark_failed(entry.id, &error.to_string(), next_attempt_at)
            .await
        {
            tracing::warn!(entry_id = %entry.id, "failed to record outbox failure: {}", e);
        }
    }

    /// Applies one intent against the owning store. Outcomes that leave the
    /// target in the intended state anyway (already-deleted worker, pending
    /// request recreated by a newer resubmission) count as delivered.
    async fn apply(&self, intent: &PropagationIntent) -> Result<(), StoreError> {
        match intent {
            PropagationIntent::WorkerStatus { worker_id, status } => {
                match self.directory.workers.set_worker_status(*worker_id, *status).await {
                    Ok(()) => {
                        tracing::debug!(
                            worker_id = %worker_id,
                            status = status.to_str(),
                            "worker status propagated"
                        );
                        Ok(())
                    }
                    Err(StoreError::NotFound) => {
                        tracing::warn!(
                            worker_id = %worker_id,
                            "worker profile gone before status propagation, dropping intent"
                        );
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            PropagationIntent::ReviewerInfo {
                reviewer_id,
                display_name,
                photo_url,
            } => {
                let outcome = self
                    .directory
                    .reviews
                    .bulk_update_reviewer_info(
                        *reviewer_id,
                        display_name.clone(),
                        photo_url.clone(),
                    )
                    .await?;
                tracing::debug!(
                    reviewer_id = %reviewer_id,
                    matched = outcome.matched_count,
                    modified = outcome.modified_count,
                    "reviewer snapshot refreshed"
                );
                Ok(())
            }
            PropagationIntent::ResubmitRequest { snapshot } => {
                self.directory
                    .requests
                    .delete_pending_for_worker(snapshot.worker_id)
                    .await?;
                match self
                    .directory
                    .requests
                    .create_verification_request(snapshot.clone())
                    .await
                {
                    Ok(_) => Ok(()),
                    // A concurrent resubmission already opened a fresh pending
                    // request; the invariant holds, nothing left to deliver.
                    Err(StoreError::DuplicatePending(_)) => Ok(()),
                    Err(e) => Err(e),
                }
            }
        }
    }
}

/// Background retry worker for the propagation outbox. The only background
/// task that touches verification/review state.
pub async fn start_outbox_worker(propagator: Propagator, poll_secs: u64) {
    let mut ticker = interval(std::time::Duration::from_secs(poll_secs.max(1)));

    loop {
        ticker.tick().await;

        match propagator.drain_due().await {
            Ok(0) => {}
            Ok(acked) => tracing::info!("outbox drain delivered {} intent(s)", acked),
            Err(e) => tracing::error!("outbox drain pass failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_caps() {
        assert_eq!(backoff_delay(0), Duration::seconds(5));
        assert_eq!(backoff_delay(1), Duration::seconds(10));
        assert_eq!(backoff_delay(3), Duration::seconds(40));
        assert_eq!(backoff_delay(10), Duration::seconds(MAX_BACKOFF_SECS));
        assert_eq!(backoff_delay(100), Duration::seconds(MAX_BACKOFF_SECS));
    }
}
