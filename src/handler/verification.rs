// handler/verification.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::verificationdtos::*,
    error::{ErrorMessage, HttpError},
    middleware::CallerIdentity,
    models::workermodel::CallerRole,
    AppState,
};

pub fn verification_handler() -> Router {
    Router::new()
        .route("/submit", post(submit_verification))
        // Admin routes
        .route("/requests", get(list_verification_requests))
        .route("/requests/:request_id/decide", put(decide_verification_request))
        .route(
            "/requests/:request_id",
            get(get_verification_request).delete(delete_verification_request),
        )
}

pub async fn submit_verification(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Json(body): Json<SubmitVerificationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if caller.role != CallerRole::Worker && !caller.is_admin() {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    // Workers may only submit for their own profile.
    if !caller.is_admin() {
        let worker = app_state
            .directory
            .workers
            .get_worker_profile(body.worker_id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?
            .ok_or_else(|| HttpError::not_found(ErrorMessage::WorkerNotFound.to_string()))?;

        if worker.user_id != caller.id {
            return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
        }
    }

    let request = app_state
        .submission_service
        .submit(
            body.worker_id,
            body.document_id,
            body.document_file_name,
            body.document_base64,
        )
        .await?;

    Ok(Json(RequestResponseDto {
        status: "success".to_string(),
        data: request,
    }))
}

pub async fn list_verification_requests(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<RequestListQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    if !caller.is_admin() {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    let requests = app_state.decision_service.list_requests(query.status).await?;

    Ok(Json(RequestListResponseDto {
        status: "success".to_string(),
        results: requests.len(),
        data: requests,
    }))
}

pub async fn get_verification_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    if !caller.is_admin() {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    let request = app_state.decision_service.get_request(request_id).await?;

    Ok(Json(RequestResponseDto {
        status: "success".to_string(),
        data: request,
    }))
}

pub async fn decide_verification_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<DecideVerificationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if !caller.is_admin() {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    let request = app_state
        .decision_service
        .decide(request_id, body.status, body.review_notes)
        .await?;

    Ok(Json(RequestResponseDto {
        status: "success".to_string(),
        data: request,
    }))
}

pub async fn delete_verification_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    if !caller.is_admin() {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    app_state.decision_service.delete_request(request_id).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Verification request deleted"
    })))
}
