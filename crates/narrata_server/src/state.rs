//! Shared handler state.

use narrata_pipeline::{BatchController, PipelineRunner, ProgressBroadcaster, ProjectStore};

/// Everything the handlers reach through `State`.
///
/// Cloning is cheap; every field shares the same underlying store.
#[derive(Debug, Clone)]
pub struct ApiState {
    runner: PipelineRunner,
    batches: BatchController,
    progress: ProgressBroadcaster,
}

impl ApiState {
    /// State serving projects run by `runner`.
    ///
    /// Progress subscriptions refresh at the runner's configured interval.
    pub fn new(runner: PipelineRunner) -> Self {
        let progress =
            ProgressBroadcaster::new(runner.store().clone(), runner.config().progress_interval());
        let batches = BatchController::new(runner.clone());
        Self {
            runner,
            batches,
            progress,
        }
    }

    /// Overrides the progress refresh period.
    pub fn with_progress(mut self, progress: ProgressBroadcaster) -> Self {
        self.progress = progress;
        self
    }

    /// The pipeline runner.
    pub fn runner(&self) -> &PipelineRunner {
        &self.runner
    }

    /// The project store.
    pub fn store(&self) -> &ProjectStore {
        self.runner.store()
    }

    /// The batch controller.
    pub fn batches(&self) -> &BatchController {
        &self.batches
    }

    /// The progress broadcaster.
    pub fn progress(&self) -> &ProgressBroadcaster {
        &self.progress
    }
}
