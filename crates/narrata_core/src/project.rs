//! Project state owned by a single pipeline execution.

use crate::{MediaCounts, MediaKind, ProjectSettings, Scene, ValidationReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifier of a project.
///
/// # Examples
///
/// ```
/// use narrata_core::ProjectId;
///
/// let a = ProjectId::generate();
/// let b = ProjectId::from("story-1".to_string());
/// assert_ne!(a, b);
/// assert_eq!(b.as_str(), "story-1");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// A fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Where a project is in its lifecycle.
///
/// Stages run in declaration order; `Completed` and `Failed` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProjectStatus {
    /// Created, not yet started
    #[default]
    Created,
    /// Segmenting source text
    TextAnalyzing,
    /// Scenes available
    TextAnalyzed,
    /// Synthesizing images
    ImagesGenerating,
    /// All images resolved
    ImagesGenerated,
    /// Synthesizing narration
    AudioGenerating,
    /// All narration resolved
    AudioGenerated,
    /// Synthesizing image-to-video clips
    VideosGenerating,
    /// All clips resolved
    VideosGenerated,
    /// Composing and encoding the final video
    Composing,
    /// Finished with an artifact
    Completed,
    /// Stopped by cancellation or an unrecovered stage failure
    Failed,
}

impl ProjectStatus {
    /// `Completed` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Failed)
    }

    /// A pipeline execution currently owns the project.
    pub fn is_running(self) -> bool {
        !self.is_terminal() && self != ProjectStatus::Created
    }
}

/// Progress of one media kind for one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepStatus {
    /// Not started
    #[default]
    Pending,
    /// Synthesis in flight
    Processing,
    /// Real media produced
    Completed,
    /// Placeholder substituted after failure
    Fallback,
    /// Not required for this project
    Skipped,
}

impl StepStatus {
    /// Resolved one way or another.
    pub fn is_done(self) -> bool {
        matches!(
            self,
            StepStatus::Completed | StepStatus::Fallback | StepStatus::Skipped
        )
    }
}

/// Per-scene status, referencing the immutable scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// The scene.
    pub scene: Arc<Scene>,
    /// Image step.
    pub image: StepStatus,
    /// Audio step.
    pub audio: StepStatus,
    /// Video step.
    pub video: StepStatus,
    /// Last failure reason recorded for this scene.
    pub last_error: Option<String>,
}

impl SceneRecord {
    /// A record with every step pending.
    pub fn new(scene: Arc<Scene>) -> Self {
        Self {
            scene,
            image: StepStatus::Pending,
            audio: StepStatus::Pending,
            video: StepStatus::Pending,
            last_error: None,
        }
    }

    /// Mutable access to one kind's step.
    pub fn step_mut(&mut self, kind: MediaKind) -> &mut StepStatus {
        match kind {
            MediaKind::Image => &mut self.image,
            MediaKind::Audio => &mut self.audio,
            MediaKind::Video => &mut self.video,
        }
    }

    /// One kind's step.
    pub fn step(&self, kind: MediaKind) -> StepStatus {
        match kind {
            MediaKind::Image => self.image,
            MediaKind::Audio => self.audio,
            MediaKind::Video => self.video,
        }
    }

    /// Audio and, when required, video are resolved.
    pub fn narration_done(&self) -> bool {
        self.audio.is_done() && self.video.is_done()
    }
}

/// Generated and failed counts per kind, plus run timing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    /// Number of scenes produced by segmentation.
    pub total_scenes: usize,
    /// Successful synthesis calls per kind.
    pub generated: MediaCounts,
    /// Failed synthesis calls (fallback used) per kind.
    pub failed: MediaCounts,
    /// When the current run started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the current run reached a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
}

impl ProjectStats {
    /// Units that fell back to placeholders.
    pub fn error_count(&self) -> u32 {
        self.failed.total()
    }

    /// Seconds between start and finish, or start and `now` while running.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        match self.started_at {
            Some(start) => {
                let end = self.finished_at.unwrap_or(now);
                (end - start).num_milliseconds().max(0) as f64 / 1000.0
            }
            None => 0.0,
        }
    }
}

/// Why a project ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// Stopped at a checkpoint after a cancel request.
    Cancelled,
    /// A whole stage failed.
    Stage {
        /// Status at the time of failure.
        stage: ProjectStatus,
        /// Error message.
        message: String,
    },
}

impl FailureReason {
    /// Whether this was a cancellation rather than an organic failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FailureReason::Cancelled)
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Cancelled => write!(f, "cancelled"),
            FailureReason::Stage { stage, message } => write!(f, "{}: {}", stage, message),
        }
    }
}

/// Where the final artifact was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// SHA-256 of the artifact bytes.
    pub content_hash: String,
    /// Backend-specific location.
    pub storage_path: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Container MIME type.
    pub mime_type: String,
    /// Declared duration.
    pub duration_seconds: f64,
    /// Whether encoding degraded to a placeholder.
    pub placeholder: bool,
}

/// Everything known about one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    /// Identifier.
    pub id: ProjectId,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Narrative text to segment.
    pub source_text: Option<String>,
    /// Generation settings.
    pub settings: ProjectSettings,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Per-scene status in scene order.
    pub scenes: Vec<SceneRecord>,
    /// Counters for the current run.
    pub stats: ProjectStats,
    /// Set by stop requests; checked between scenes and stages.
    pub cancel_requested: bool,
    /// Set when the project enters `Failed`.
    pub failure: Option<FailureReason>,
    /// The final video, once composed.
    pub artifact: Option<ArtifactRef>,
    /// Quality checks over the last completed run.
    #[serde(default)]
    pub validation: Option<ValidationReport>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl ProjectState {
    /// A new project in `Created`.
    pub fn new(id: ProjectId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: None,
            source_text: None,
            settings: ProjectSettings::default(),
            status: ProjectStatus::Created,
            scenes: Vec::new(),
            stats: ProjectStats::default(),
            cancel_requested: false,
            failure: None,
            artifact: None,
            validation: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the source text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = Some(text.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets generation settings.
    pub fn with_settings(mut self, settings: ProjectSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Moves to a new status and stamps the update time.
    pub fn transition(&mut self, to: ProjectStatus) {
        self.status = to;
        self.updated_at = Utc::now();
        if to.is_terminal() {
            self.stats.finished_at = Some(self.updated_at);
        }
    }

    /// Clears everything a previous run left behind and returns to `Created`.
    pub fn reset_for_run(&mut self) {
        self.scenes.clear();
        self.stats = ProjectStats::default();
        self.cancel_requested = false;
        self.failure = None;
        self.artifact = None;
        self.validation = None;
        self.transition(ProjectStatus::Created);
    }

    /// Enters `Failed` with the given reason.
    pub fn fail(&mut self, reason: FailureReason) {
        self.failure = Some(reason);
        self.transition(ProjectStatus::Failed);
    }

    /// A compact listing entry.
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            status: self.status,
            scene_count: self.scenes.len(),
            has_text: self.source_text.is_some(),
            error_count: self.stats.error_count(),
            created_at: self.created_at,
        }
    }
}

/// Listing entry for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Identifier.
    pub id: ProjectId,
    /// Display title.
    pub title: String,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Scenes from the latest run.
    pub scene_count: usize,
    /// Whether source text is attached.
    pub has_text: bool,
    /// Placeholder substitutions in the latest run.
    pub error_count: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
