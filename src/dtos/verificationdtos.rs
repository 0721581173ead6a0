// dtos/verificationdtos.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::verificationmodels::{RequestStatus, VerificationRequest};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct SubmitVerificationDto {
    pub worker_id: Uuid,

    #[validate(length(min = 1, message = "Document ID is required"))]
    pub document_id: String,

    #[validate(length(min = 1, message = "Document file name is required"))]
    pub document_file_name: String,

    // Base64 encoded document image
    #[validate(length(min = 1, message = "Document payload is required"))]
    pub document_base64: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct DecideVerificationDto {
    pub status: RequestStatus,

    #[validate(length(max = 500, message = "Review notes must be less than 500 characters"))]
    pub review_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestListQueryDto {
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RequestResponseDto {
    pub status: String,
    pub data: VerificationRequest,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RequestListResponseDto {
    pub status: String,
    pub results: usize,
    pub data: Vec<VerificationRequest>,
}
