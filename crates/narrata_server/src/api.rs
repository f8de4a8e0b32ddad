//! Route table.

use crate::models::HealthResponse;
use crate::{ApiState, analysis, batches, projects, ws};
use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};

/// Creates the router for every endpoint.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/projects/:id/text", put(projects::put_text))
        .route("/projects/:id/start", post(projects::start_project))
        .route("/projects/:id/stop", post(projects::stop_project))
        .route("/projects/:id/progress", get(projects::get_progress))
        .route("/projects/:id/artifact", get(projects::get_artifact))
        .route("/analyze-text", post(analysis::analyze_text))
        .route("/batches", post(batches::submit_batch))
        .route("/batches/:id", get(batches::get_batch))
        .route("/ws/:id", get(ws::progress_socket))
        .with_state(state)
}

/// Health check with store and pipeline counters.
async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        projects: state.store().len(),
        active_pipelines: state.store().running_count(),
        active_batches: state.batches().active().len(),
        metrics: state.runner().metrics().snapshot(),
    })
}
