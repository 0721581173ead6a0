// handler/workers.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{reviewdtos::ReviewListResponseDto, workerdtos::*},
    error::{ErrorMessage, HttpError},
    middleware::CallerIdentity,
    models::workermodel::CallerRole,
    AppState,
};

pub fn workers_handler() -> Router {
    Router::new()
        .route("/", post(register_worker).get(get_all_workers))
        .route(
            "/:worker_id",
            get(get_worker_by_id)
                .patch(patch_worker_profile)
                .delete(delete_worker),
        )
        .route("/:worker_id/reviews", get(get_worker_reviews))
}

pub async fn register_worker(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Json(body): Json<RegisterWorkerDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if caller.role != CallerRole::Worker && !caller.is_admin() {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    let worker = app_state
        .directory
        .workers
        .create_worker_profile(body.user_id, body.name, body.email, body.category)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(WorkerResponseDto {
        status: "success".to_string(),
        data: EnrichedWorkerDto::from_profile(worker, 0.0, 0),
    }))
}

pub async fn get_all_workers(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let workers = app_state.listing_service.get_all_workers().await?;

    Ok(Json(WorkerListResponseDto {
        status: "success".to_string(),
        results: workers.len(),
        data: workers,
    }))
}

pub async fn get_worker_by_id(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(worker_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let worker = app_state.listing_service.get_worker_by_id(worker_id).await?;

    Ok(Json(WorkerResponseDto {
        status: "success".to_string(),
        data: worker,
    }))
}

/// Admins push a status (decision propagation); workers edit their own
/// identity/category/document fields, where a new document forces the
/// profile back to pending.
pub async fn patch_worker_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(worker_id): Path<Uuid>,
    Json(body): Json<PatchWorkerDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let worker = if caller.is_admin() {
        let status = body.status.ok_or_else(|| {
            HttpError::bad_request("Admin patches must carry a status".to_string())
        })?;
        app_state
            .submission_service
            .set_worker_status(worker_id, status)
            .await?
    } else {
        if caller.role != CallerRole::Worker {
            return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
        }
        if body.status.is_some() {
            return Err(HttpError::forbidden(
                "Only admins may set a worker status directly".to_string(),
            ));
        }

        let existing = app_state
            .directory
            .workers
            .get_worker_profile(worker_id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?
            .ok_or_else(|| HttpError::not_found(ErrorMessage::WorkerNotFound.to_string()))?;
        if existing.user_id != caller.id {
            return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
        }

        app_state
            .submission_service
            .patch_worker(worker_id, body)
            .await?
    };

    let summary = app_state.listing_service.get_worker_by_id(worker.id).await?;

    Ok(Json(WorkerResponseDto {
        status: "success".to_string(),
        data: summary,
    }))
}

pub async fn delete_worker(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(worker_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    if !caller.is_admin() {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    app_state
        .directory
        .workers
        .delete_worker_profile(worker_id)
        .await
        .map_err(|e| match e {
            crate::db::StoreError::NotFound => {
                HttpError::not_found(ErrorMessage::WorkerNotFound.to_string())
            }
            other => HttpError::server_error(other.to_string()),
        })?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Worker profile deleted"
    })))
}

pub async fn get_worker_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(worker_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let reviews = app_state
        .reviewer_sync_service
        .reviews_for_worker(worker_id)
        .await?;

    Ok(Json(ReviewListResponseDto {
        status: "success".to_string(),
        results: reviews.len(),
        data: reviews,
    }))
}
