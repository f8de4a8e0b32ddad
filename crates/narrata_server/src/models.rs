//! Request and response bodies.

use narrata_core::{ErrorPolicy, ProjectId, ProjectSettings, ProjectStatus, Scene};
use narrata_pipeline::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Body of `POST /projects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    /// Display title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Narrative text, if already available.
    #[serde(default)]
    pub text: Option<String>,
    /// Generation settings; defaults apply when omitted.
    #[serde(default)]
    pub settings: Option<ProjectSettings>,
    /// Start the pipeline right away when text is given.
    #[serde(default)]
    pub auto_start: bool,
}

/// Body of `PUT /projects/:id`; omitted fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// Replacement generation settings.
    #[serde(default)]
    pub settings: Option<ProjectSettings>,
}

/// Body of `POST /analyze-text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeTextRequest {
    /// Narrative text to segment.
    pub text: String,
}

/// Reply to `POST /analyze-text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeTextResponse {
    /// Name of the segmenter that produced the scenes.
    pub segmenter: String,
    /// Scenes in narrative order.
    pub scenes: Vec<Scene>,
}

/// Body of `POST /batches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Projects in submission order.
    pub project_ids: Vec<ProjectId>,
    /// Maximum concurrent pipelines; the service default when omitted.
    #[serde(default)]
    pub concurrency_limit: Option<usize>,
    /// Failure handling.
    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

/// Reply to start and stop requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    /// Project.
    pub project_id: ProjectId,
    /// Status after the request.
    pub status: ProjectStatus,
    /// Whether a stop has been requested.
    pub cancel_requested: bool,
}

/// Reply to `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Projects in the store.
    pub projects: usize,
    /// Pipelines currently running.
    pub active_pipelines: usize,
    /// Batches currently running.
    pub active_batches: usize,
    /// Process-wide counters.
    pub metrics: MetricsSnapshot,
}
