// models/verificationmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Verified,
    Rejected,
}

impl RequestStatus {
    pub fn to_str(&self) -> &str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Verified => "verified",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "verified" => Ok(RequestStatus::Verified),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status: {}", other)),
        }
    }
}

/// One review task for a worker's submitted or resubmitted credentials.
/// The submitted fields are a snapshot copied at submission time, not a
/// live link into the worker profile.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct VerificationRequest {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub worker_name: String,
    pub category: String,
    pub document_url: String,
    pub document_id: String,
    pub status: RequestStatus,
    pub review_notes: Option<String>,
    pub request_date: DateTime<Utc>,
    pub review_date: Option<DateTime<Utc>>,
}

/// The fields captured from a worker profile when a request is opened.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RequestSnapshot {
    pub worker_id: Uuid,
    pub worker_name: String,
    pub category: String,
    pub document_url: String,
    pub document_id: String,
}
