//! Project lifecycle endpoints.

use crate::models::{CreateProjectRequest, RunResponse, UpdateProjectRequest};
use crate::{ApiError, ApiState};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::Utc;
use narrata_core::{ProgressView, ProjectId, ProjectState, ProjectSummary};
use narrata_error::{NarrataError, PipelineError, PipelineErrorKind};
use tracing::{info, instrument};

fn not_found(id: &ProjectId) -> ApiError {
    let err = PipelineError::new(PipelineErrorKind::ProjectNotFound(id.to_string()));
    NarrataError::from(err).into()
}

fn run_response(state: &ProjectState) -> RunResponse {
    RunResponse {
        project_id: state.id.clone(),
        status: state.status,
        cancel_requested: state.cancel_requested,
    }
}

/// Detaches a started pipeline; its outcome lands in the store.
fn launch(state: &ApiState, id: &ProjectId) -> Result<(), ApiError> {
    let handle = state.runner().start(id)?;
    tokio::spawn(async move {
        handle.wait().await;
    });
    Ok(())
}

/// `POST /projects`
#[instrument(skip(state, request), fields(title = %request.title, auto_start = request.auto_start))]
pub async fn create_project(
    State(state): State<ApiState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectState>), ApiError> {
    let id = ProjectId::generate();
    let mut project = ProjectState::new(id.clone(), request.title);
    project.description = request.description;
    project.source_text = request.text;
    if let Some(settings) = request.settings {
        project.settings = settings;
    }
    let has_text = project
        .source_text
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    state.store().insert(project);
    info!(project_id = %id, "Project created");

    if request.auto_start && has_text {
        launch(&state, &id)?;
    }

    let created = state.store().get(&id).ok_or_else(|| not_found(&id))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /projects`
pub async fn list_projects(State(state): State<ApiState>) -> Json<Vec<ProjectSummary>> {
    Json(state.store().list())
}

/// `GET /projects/:id`
pub async fn get_project(
    State(state): State<ApiState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<ProjectState>, ApiError> {
    state.store().get(&id).map(Json).ok_or_else(|| not_found(&id))
}

/// `PUT /projects/:id`
///
/// Settings are read when a run starts, so edits are refused while one is
/// in progress.
#[instrument(skip(state, id, request), fields(project_id = %id))]
pub async fn update_project(
    State(state): State<ApiState>,
    Path(id): Path<ProjectId>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectState>, ApiError> {
    let updated = state
        .store()
        .update(&id, |project| {
            if project.status.is_running() {
                return Err(ApiError::conflict(format!(
                    "Cannot update project {} while it is running",
                    id
                )));
            }
            if let Some(title) = request.title {
                project.title = title;
            }
            if let Some(description) = request.description {
                project.description = Some(description);
            }
            if let Some(settings) = request.settings {
                project.settings = settings;
            }
            project.updated_at = Utc::now();
            Ok(project.clone())
        })
        .ok_or_else(|| not_found(&id))??;
    info!("Project updated");
    Ok(Json(updated))
}

/// `DELETE /projects/:id`
///
/// A running pipeline notices the removal at its next checkpoint and ends
/// as cancelled.
#[instrument(skip(state, id), fields(project_id = %id))]
pub async fn delete_project(
    State(state): State<ApiState>,
    Path(id): Path<ProjectId>,
) -> Result<StatusCode, ApiError> {
    let removed = state.store().remove(&id).ok_or_else(|| not_found(&id))?;
    if let Some(artifact) = &removed.artifact {
        if let Err(e) = state.runner().storage().delete(artifact).await {
            tracing::warn!(error = %e, "Failed to delete project artifact");
        }
    }
    info!("Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /projects/:id/text`
#[instrument(skip(state, id, body), fields(project_id = %id, chars = body.len()))]
pub async fn put_text(
    State(state): State<ApiState>,
    Path(id): Path<ProjectId>,
    body: String,
) -> Result<Json<ProjectSummary>, ApiError> {
    state
        .store()
        .update(&id, |project| {
            if project.status.is_running() {
                return Err(ApiError::conflict(format!(
                    "Cannot replace text while project {} is running",
                    id
                )));
            }
            project.source_text = Some(body);
            project.updated_at = Utc::now();
            Ok(project.summary())
        })
        .ok_or_else(|| not_found(&id))?
        .map(Json)
}

/// `POST /projects/:id/start`
#[instrument(skip(state, id), fields(project_id = %id))]
pub async fn start_project(
    State(state): State<ApiState>,
    Path(id): Path<ProjectId>,
) -> Result<(StatusCode, Json<RunResponse>), ApiError> {
    launch(&state, &id)?;
    let project = state.store().get(&id).ok_or_else(|| not_found(&id))?;
    Ok((StatusCode::ACCEPTED, Json(run_response(&project))))
}

/// `POST /projects/:id/stop`
#[instrument(skip(state, id), fields(project_id = %id))]
pub async fn stop_project(
    State(state): State<ApiState>,
    Path(id): Path<ProjectId>,
) -> Result<(StatusCode, Json<RunResponse>), ApiError> {
    let response = state
        .store()
        .update(&id, |project| {
            if project.status.is_running() {
                project.cancel_requested = true;
            }
            run_response(project)
        })
        .ok_or_else(|| not_found(&id))?;
    info!(cancel_requested = response.cancel_requested, "Stop requested");
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// `GET /projects/:id/progress`
pub async fn get_progress(
    State(state): State<ApiState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<ProgressView>, ApiError> {
    state
        .progress()
        .snapshot(&id)
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// `GET /projects/:id/artifact`
#[instrument(skip(state, id), fields(project_id = %id))]
pub async fn get_artifact(
    State(state): State<ApiState>,
    Path(id): Path<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
    let artifact = state
        .store()
        .read(&id, |project| project.artifact.clone())
        .ok_or_else(|| not_found(&id))?
        .ok_or_else(|| ApiError::not_found(format!("Project {} has no artifact yet", id)))?;
    let bytes = state.runner().storage().retrieve(&artifact).await?;
    Ok((
        [
            (header::CONTENT_TYPE, artifact.mime_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.mp4\"", id),
            ),
        ],
        bytes,
    ))
}
