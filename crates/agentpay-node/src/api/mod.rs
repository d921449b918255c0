//! HTTP API.

pub mod error;
pub mod health;
pub mod jobs;
pub mod ws;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Service
        .route("/health", get(health::health_check))
        .route("/availability", get(health::availability))
        .route("/input_schema", get(health::input_schema))

        // Jobs
        .route("/jobs", post(jobs::create_job).get(jobs::list_jobs))
        .route("/jobs/:id", get(jobs::get_job))
        .route("/jobs/:id/payment", post(jobs::submit_payment))

        // WebSocket endpoints
        .route("/ws/jobs/:id", get(ws::job_stream))

        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
