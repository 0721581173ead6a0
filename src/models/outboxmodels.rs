// models/outboxmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{verificationmodels::RequestSnapshot, workermodel::WorkerStatus};

/// A durable record of one cross-store write that still has to happen.
/// Entries are drained by the retry worker until acknowledged, giving the
/// propagation paths at-least-once delivery.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropagationIntent {
    /// Push a decided verdict into the worker profile store.
    WorkerStatus {
        worker_id: Uuid,
        status: WorkerStatus,
    },
    /// Refresh the denormalized reviewer snapshot on every matching review.
    ReviewerInfo {
        reviewer_id: Uuid,
        display_name: Option<String>,
        photo_url: Option<String>,
    },
    /// Re-open a verification request after a resubmission whose request-store
    /// calls failed post profile commit.
    ResubmitRequest { snapshot: RequestSnapshot },
}

impl PropagationIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            PropagationIntent::WorkerStatus { .. } => "worker_status",
            PropagationIntent::ReviewerInfo { .. } => "reviewer_info",
            PropagationIntent::ResubmitRequest { .. } => "resubmit_request",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub attempts: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub acked_at: Option<DateTime<Utc>>,
}

impl OutboxEntry {
    pub fn intent(&self) -> Result<PropagationIntent, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
