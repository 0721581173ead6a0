// middleware.rs
use axum::{extract::Request, middleware::Next, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ErrorMessage, HttpError},
    models::workermodel::CallerRole,
};

pub const CALLER_ID_HEADER: &str = "x-caller-id";
pub const CALLER_ROLE_HEADER: &str = "x-caller-role";

/// Authenticated caller as established by the edge: session handling lives
/// in a collaborator, which forwards only an id and a role.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct CallerIdentity {
    pub id: Uuid,
    pub role: CallerRole,
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == CallerRole::Admin
    }
}

pub async fn identity(mut req: Request, next: Next) -> Result<impl IntoResponse, HttpError> {
    let caller_id = req
        .headers()
        .get(CALLER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::CallerIdentityNotProvided.to_string()))?;

    let caller_role = req
        .headers()
        .get(CALLER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::CallerIdentityNotProvided.to_string()))?;

    let id = Uuid::parse_str(caller_id)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidCallerIdentity.to_string()))?;

    let role: CallerRole = caller_role
        .parse()
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidCallerIdentity.to_string()))?;

    req.extensions_mut().insert(CallerIdentity { id, role });

    Ok(next.run(req).await)
}
