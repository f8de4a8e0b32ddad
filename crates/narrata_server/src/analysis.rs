//! Segmentation preview without a project.

use crate::models::{AnalyzeTextRequest, AnalyzeTextResponse};
use crate::{ApiError, ApiState};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::{info, instrument};

/// `POST /analyze-text`
///
/// Runs the configured segmenter and returns its scenes; nothing is stored.
#[instrument(skip(state, request), fields(chars = request.text.len()))]
pub async fn analyze_text(
    State(state): State<ApiState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalyzeTextResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Text is empty"));
    }
    let segmenter = state.runner().segmenter();
    let scenes = segmenter.segment(&request.text).await.map_err(|e| {
        ApiError::new(
            StatusCode::BAD_GATEWAY,
            format!("Text analysis failed: {}", e),
        )
    })?;
    info!(scenes = scenes.len(), segmenter = segmenter.name(), "Text analyzed");
    Ok(Json(AnalyzeTextResponse {
        segmenter: segmenter.name().to_string(),
        scenes,
    }))
}
