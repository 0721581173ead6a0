// service/error.rs
use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    db::StoreError,
    error::HttpError,
    models::verificationmodels::RequestStatus,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Worker profile {0} not found")]
    WorkerNotFound(Uuid),

    #[error("Verification request {0} not found")]
    RequestNotFound(Uuid),

    #[error("Verification request {0} is already {}", .1.to_str())]
    RequestAlreadyDecided(Uuid, RequestStatus),

    #[error("A pending verification request already exists for worker {0}")]
    DuplicatePending(Uuid),

    #[error("Resubmission limit reached for worker {0}, try again after 24 hours")]
    RateLimited(Uuid),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicatePending(worker_id) => ServiceError::DuplicatePending(worker_id),
            StoreError::Unavailable(msg) => ServiceError::Upstream(msg),
            other => ServiceError::Store(other),
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let message = error.to_string();
        HttpError::new(message, error.status_code())
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::WorkerNotFound(_) | ServiceError::RequestNotFound(_) => {
                StatusCode::NOT_FOUND
            }

            ServiceError::RequestAlreadyDecided(_, _) | ServiceError::DuplicatePending(_) => {
                StatusCode::CONFLICT
            }

            ServiceError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,

            ServiceError::Upstream(_) | ServiceError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
