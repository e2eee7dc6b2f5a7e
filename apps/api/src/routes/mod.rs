pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::planning::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Form options
        .route("/api/v1/areas", get(handlers::handle_list_areas))
        .route("/api/v1/jobs", get(handlers::handle_list_jobs))
        .route(
            "/api/v1/competencies",
            get(handlers::handle_list_competencies),
        )
        // Career plan
        .route("/api/v1/plans", post(handlers::handle_generate_plan))
        .route("/api/v1/plans/export", post(handlers::handle_export_plan))
        .with_state(state)
}
