// handler/reviews.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::reviewdtos::*,
    error::{ErrorMessage, HttpError},
    middleware::CallerIdentity,
    models::workermodel::CallerRole,
    AppState,
};

pub fn reviews_handler() -> Router {
    Router::new()
        .route("/", post(create_review))
        // Called by the identity collaborator when a profile changes.
        .route("/reviewer/:reviewer_id", put(bulk_update_reviewer_info))
}

pub async fn create_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Json(body): Json<CreateReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if caller.role != CallerRole::Client {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    // The reviewer snapshot is copied in at write time; later identity
    // changes reach it only through reviewer-info propagation.
    let review = app_state
        .reviewer_sync_service
        .create_review(
            caller.id,
            body.reviewer_name,
            body.reviewer_photo_url,
            body.target_id,
            body.rating,
            body.comment,
        )
        .await?;

    Ok(Json(ReviewResponseDto {
        status: "success".to_string(),
        data: review,
    }))
}

pub async fn bulk_update_reviewer_info(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(reviewer_id): Path<Uuid>,
    Json(body): Json<ReviewerInfoDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    // A client may refresh its own snapshots; anything else is admin-only.
    if !caller.is_admin() && caller.id != reviewer_id {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    let outcome = app_state
        .reviewer_sync_service
        .bulk_update_reviewer_info(reviewer_id, body.display_name, body.photo_url)
        .await?;

    Ok(Json(ReviewerSyncResponseDto {
        status: "success".to_string(),
        data: outcome,
    }))
}
