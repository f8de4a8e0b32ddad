//! Project pipeline and batch errors.

/// Failures that stop a pipeline, reject a request, or abort a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// No project with this id exists in the store
    #[display("Project not found: {}", _0)]
    ProjectNotFound(String),
    /// A pipeline is already executing for this project
    #[display("Project {} is already processing", _0)]
    AlreadyRunning(String),
    /// The project has no source text to segment
    #[display("Project {} has no source text", _0)]
    NoSourceText(String),
    /// The segmenter failed outright
    #[display("Scene segmentation failed: {}", _0)]
    Segmentation(String),
    /// The segmenter returned zero scenes
    #[display("Scene segmentation produced no scenes")]
    NoScenes,
    /// Cooperative cancellation was observed
    #[display("cancelled")]
    Cancelled,
    /// A batch concurrency limit of zero was requested
    #[display("Invalid concurrency limit: {}", _0)]
    InvalidConcurrency(usize),
    /// A fail-fast batch stopped at this member
    #[display("Batch member {} failed: {}", project_id, reason)]
    BatchMemberFailed {
        /// The first failing member
        project_id: String,
        /// Why it failed
        reason: String,
    },
}

/// Pipeline error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new pipeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
