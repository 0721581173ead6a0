// models/reviewmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client review of a worker. Reviewer name/photo are denormalized:
/// copied in at write time and refreshed only by reviewer-info propagation,
/// so review reads never depend on the identity service.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewer_name: String,
    pub reviewer_photo_url: Option<String>,
    pub target_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate derived from review records for one worker.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub rating: f64,
    pub review_count: i64,
}

impl RatingSummary {
    pub fn empty() -> Self {
        Self {
            rating: 0.0,
            review_count: 0,
        }
    }
}
