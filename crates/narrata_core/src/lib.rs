//! Core data types for narrata.
//!
//! Scenes, generation outcomes, media tracks, timelines and project state
//! shared by the media, pipeline and server crates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod media;
mod outcome;
mod progress;
mod project;
mod scene;
mod settings;
mod timeline;
mod validation;

pub use batch::{BatchFailure, BatchReport, BatchRun, BatchView, ErrorPolicy};
pub use media::{AudioClip, ImageAsset, MediaCounts, MediaKind, VideoClip, Visual};
pub use outcome::GenerationOutcome;
pub use progress::ProgressView;
pub use project::{
    ArtifactRef, FailureReason, ProjectId, ProjectState, ProjectStats, ProjectStatus,
    ProjectSummary, SceneRecord, StepStatus,
};
pub use scene::{Scene, SceneBuilder};
pub use settings::{GenerationParams, ProjectSettings, ProjectSettingsBuilder};
pub use timeline::{Timeline, TimelineSegment, Transition, VideoArtifact};
pub use validation::ValidationReport;
