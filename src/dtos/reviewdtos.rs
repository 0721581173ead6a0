// dtos/reviewdtos.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{db::reviewdb::ReviewerSyncOutcome, models::reviewmodels::ReviewRecord};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewDto {
    pub target_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub comment: String,

    #[validate(length(min = 1, message = "Reviewer name is required"))]
    pub reviewer_name: String,

    pub reviewer_photo_url: Option<String>,
}

/// Identity change fanned out to every review the reviewer has written.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerInfoDto {
    #[validate(length(min = 1, message = "Display name must not be empty"))]
    pub display_name: Option<String>,

    pub photo_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponseDto {
    pub status: String,
    pub data: ReviewRecord,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewListResponseDto {
    pub status: String,
    pub results: usize,
    pub data: Vec<ReviewRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewerSyncResponseDto {
    pub status: String,
    pub data: ReviewerSyncOutcome,
}
