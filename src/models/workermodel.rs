// models/workermodel.rs
use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "worker_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Pending,
    Approved,
    Rejected,
}

impl WorkerStatus {
    pub fn to_str(&self) -> &str {
        match self {
            WorkerStatus::Pending => "pending",
            WorkerStatus::Approved => "approved",
            WorkerStatus::Rejected => "rejected",
        }
    }
}

/// Role forwarded by the edge alongside the caller id. Session handling
/// itself lives in a collaborator.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    Admin,
    Worker,
    Client,
}

impl std::str::FromStr for CallerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(CallerRole::Admin),
            "worker" => Ok(CallerRole::Worker),
            "client" => Ok(CallerRole::Client),
            other => Err(format!("unknown caller role: {}", other)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct WorkerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub category: String,
    pub document_url: Option<String>,
    pub document_id: Option<String>,
    pub status: WorkerStatus,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
