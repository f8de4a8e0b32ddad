//! Read-only progress projection.

use crate::{FailureReason, ProjectId, ProjectState, ProjectStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a listener sees of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressView {
    /// Project.
    pub project_id: ProjectId,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Status name, for display.
    pub current_stage: String,
    /// Completed scene steps over all scene steps, in percent.
    pub percent_complete: f64,
    /// Scenes produced by segmentation.
    pub total_scenes: usize,
    /// Real images produced.
    pub images_generated: u32,
    /// Real narration clips produced.
    pub audio_generated: u32,
    /// Real motion clips produced.
    pub videos_generated: u32,
    /// Any placeholder substitution happened.
    pub has_errors: bool,
    /// Number of placeholder substitutions.
    pub error_count: u32,
    /// The project reached `Completed`.
    pub is_complete: bool,
    /// Why the project failed, if it did.
    pub failure: Option<FailureReason>,
    /// Seconds since the run started.
    pub elapsed_seconds: f64,
}

impl ProgressView {
    /// Projects a state at the given instant.
    ///
    /// Each scene contributes two steps: its image, and its narration
    /// (audio plus the optional motion clip).
    pub fn from_state(state: &ProjectState, now: DateTime<Utc>) -> Self {
        let total = state.scenes.len();
        let percent_complete = if state.status == ProjectStatus::Completed {
            100.0
        } else if total == 0 {
            0.0
        } else {
            let images = state.scenes.iter().filter(|s| s.image.is_done()).count();
            let narration = state.scenes.iter().filter(|s| s.narration_done()).count();
            (images + narration) as f64 / (2 * total) as f64 * 100.0
        };
        let error_count = state.stats.error_count();

        Self {
            project_id: state.id.clone(),
            status: state.status,
            current_stage: state.status.to_string(),
            percent_complete,
            total_scenes: state.stats.total_scenes,
            images_generated: state.stats.generated.image,
            audio_generated: state.stats.generated.audio,
            videos_generated: state.stats.generated.video,
            has_errors: error_count > 0,
            error_count,
            is_complete: state.status == ProjectStatus::Completed,
            failure: state.failure.clone(),
            elapsed_seconds: state.stats.elapsed_seconds(now),
        }
    }
}
