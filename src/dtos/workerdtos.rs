// dtos/workerdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::workermodel::{WorkerProfile, WorkerStatus};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RegisterWorkerDto {
    pub user_id: uuid::Uuid,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Valid email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
}

/// Worker self-edit or admin status push. A populated document payload makes
/// the edit a resubmission; `status` is only honored for admin callers.
#[derive(Validate, Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatchWorkerDto {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,

    pub photo_url: Option<String>,

    #[validate(length(min = 1, message = "Category must not be empty"))]
    pub category: Option<String>,

    pub document_id: Option<String>,
    pub document_file_name: Option<String>,
    // Base64 encoded document image
    pub document_base64: Option<String>,

    pub status: Option<WorkerStatus>,
}

impl PatchWorkerDto {
    pub fn has_new_document(&self) -> bool {
        self.document_base64.is_some()
    }
}

/// Worker profile read model, enriched with aggregates derived from the
/// review store.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EnrichedWorkerDto {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub category: String,
    pub document_url: Option<String>,
    pub status: WorkerStatus,
    pub joined_at: DateTime<Utc>,
    pub rating: f64,
    pub review_count: i64,
}

impl EnrichedWorkerDto {
    pub fn from_profile(worker: WorkerProfile, rating: f64, review_count: i64) -> Self {
        Self {
            id: worker.id,
            user_id: worker.user_id,
            name: worker.name,
            email: worker.email,
            photo_url: worker.photo_url,
            category: worker.category,
            document_url: worker.document_url,
            status: worker.status,
            joined_at: worker.joined_at,
            rating,
            review_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkerResponseDto {
    pub status: String,
    pub data: EnrichedWorkerDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkerListResponseDto {
    pub status: String,
    pub results: usize,
    pub data: Vec<EnrichedWorkerDto>,
}
