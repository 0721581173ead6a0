mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderName, Method,
};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::{
    db::{db::DBClient, directory::Directory},
    service::{
        decision_service::DecisionService,
        document_storage::HttpDocumentStorage,
        listing_service::ListingService,
        outbox::{start_outbox_worker, Propagator},
        reviewer_sync_service::ReviewerSyncService,
        submission_service::SubmissionService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Directory>,
    pub submission_service: SubmissionService,
    pub decision_service: DecisionService,
    pub reviewer_sync_service: ReviewerSyncService,
    pub listing_service: ListingService,
    pub propagator: Propagator,
}

impl AppState {
    pub fn new(db_client: DBClient, config: &Config) -> Self {
        let store = Arc::new(db_client);

        // Each field is one named collaborator endpoint. The stores happen to
        // share a client here, but nothing may assume that: no call path
        // spans two stores in one transaction.
        let directory = Arc::new(Directory {
            workers: store.clone(),
            requests: store.clone(),
            reviews: store.clone(),
            outbox: store,
            documents: Arc::new(HttpDocumentStorage::new(config)),
        });

        let propagator = Propagator::new(directory.clone());

        Self {
            submission_service: SubmissionService::new(directory.clone(), propagator.clone()),
            decision_service: DecisionService::new(directory.clone(), propagator.clone()),
            reviewer_sync_service: ReviewerSyncService::new(directory.clone()),
            listing_service: ListingService::new(directory.clone()),
            directory,
            propagator,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("connected to the database");
            pool
        }
        Err(err) => {
            tracing::error!("failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    // Periodic pool health log. Unrelated to verification/review state.
    let pool_for_monitoring = pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));
        loop {
            interval.tick().await;
            let size = pool_for_monitoring.size();
            let idle = pool_for_monitoring.num_idle();
            tracing::debug!(
                "pool status - active: {}, idle: {}, total: {}",
                size - idle as u32,
                idle,
                size
            );
        }
    });

    let db_client = DBClient::new(pool);
    let app_state = Arc::new(AppState::new(db_client, &config));

    // Retry worker for the propagation outbox.
    let propagator = app_state.propagator.clone();
    let poll_secs = config.outbox_poll_secs;
    tokio::spawn(async move {
        start_outbox_worker(propagator, poll_secs).await;
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([
            AUTHORIZATION,
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(middleware::CALLER_ID_HEADER),
            HeaderName::from_static(middleware::CALLER_ROLE_HEADER),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ]);

    let app = create_router(app_state.clone()).layer(cors);

    tracing::info!("server is running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
