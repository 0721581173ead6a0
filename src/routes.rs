// routes.rs
use std::sync::Arc;

use axum::{middleware, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{reviews::reviews_handler, verification::verification_handler, workers::workers_handler},
    middleware::identity,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest(
            "/workers",
            workers_handler().layer(middleware::from_fn(identity)),
        )
        .nest(
            "/verification",
            verification_handler().layer(middleware::from_fn(identity)),
        )
        .nest(
            "/reviews",
            reviews_handler().layer(middleware::from_fn(identity)),
        )
        .route("/healthcheck", axum::routing::get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new().nest("/api", api_route)
}
