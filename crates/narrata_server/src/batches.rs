//! Batch submission endpoints.

use crate::models::BatchRequest;
use crate::{ApiError, ApiState};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use narrata_core::{BatchRun, BatchView};
use tracing::{info, instrument, warn};

/// `POST /batches`
///
/// Registers the batch and returns immediately. `GET /batches/:id` shows it
/// while running and keeps its report once every member has finished.
#[instrument(skip(state, request), fields(members = request.project_ids.len()))]
pub async fn submit_batch(
    State(state): State<ApiState>,
    Json(request): Json<BatchRequest>,
) -> Result<(StatusCode, Json<BatchRun>), ApiError> {
    let limit = request
        .concurrency_limit
        .unwrap_or(*state.runner().config().default_batch_concurrency());
    let batch = BatchRun::new(request.project_ids, limit, request.error_policy);
    let batch_id = batch.id.clone();

    let task = state.batches().submit(batch.clone())?;
    tokio::spawn(async move {
        match task.await {
            Ok(Ok(report)) => info!(
                batch_id = %report.batch_id,
                succeeded = report.success_count(),
                failed = report.failure_count(),
                "Batch report ready"
            ),
            Ok(Err(e)) => warn!(batch_id = %batch_id, error = %e, "Batch stopped"),
            Err(e) => warn!(batch_id = %batch_id, error = %e, "Batch task aborted"),
        }
    });

    Ok((StatusCode::ACCEPTED, Json(batch)))
}

/// `GET /batches/:id`
pub async fn get_batch(
    State(state): State<ApiState>,
    Path(batch_id): Path<String>,
) -> Result<Json<BatchView>, ApiError> {
    state
        .batches()
        .view(&batch_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Batch {} not found", batch_id)))
}
