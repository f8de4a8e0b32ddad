//! Pipeline settings.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How synthesis calls, pipelines and batches are bounded.
///
/// # Examples
///
/// ```
/// use narrata_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default().with_worker_pool_size(8usize);
/// assert_eq!(*config.worker_pool_size(), 8);
/// assert_eq!(config.synthesis_timeout().as_secs(), 120);
/// assert_eq!(*config.retry_attempts(), 1);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct PipelineConfig {
    /// Time budget for one synthesis attempt.
    #[serde(default = "default_synthesis_timeout_secs")]
    synthesis_timeout_secs: u64,
    /// Attempts per synthesis call, including the first; no backoff between them.
    #[serde(default = "default_retry_attempts")]
    retry_attempts: u32,
    /// Synthesis calls allowed in flight across all projects.
    #[serde(default = "default_worker_pool_size")]
    worker_pool_size: usize,
    /// Whether scenes get an image-to-video clip unless a project overrides it.
    #[serde(default)]
    video_from_image: bool,
    /// Refresh period of progress subscriptions.
    #[serde(default = "default_progress_interval_ms")]
    progress_interval_ms: u64,
    /// Batch concurrency used when a submission does not give one.
    #[serde(default = "default_batch_concurrency")]
    default_batch_concurrency: usize,
    /// Finished batch reports kept for lookup, oldest dropped first.
    #[serde(default = "default_batch_history")]
    batch_history: usize,
}

fn default_synthesis_timeout_secs() -> u64 {
    120
}

fn default_retry_attempts() -> u32 {
    1
}

fn default_worker_pool_size() -> usize {
    3
}

fn default_progress_interval_ms() -> u64 {
    2000
}

fn default_batch_concurrency() -> usize {
    1
}

fn default_batch_history() -> usize {
    32
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            synthesis_timeout_secs: default_synthesis_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            worker_pool_size: default_worker_pool_size(),
            video_from_image: false,
            progress_interval_ms: default_progress_interval_ms(),
            default_batch_concurrency: default_batch_concurrency(),
            batch_history: default_batch_history(),
        }
    }
}

impl PipelineConfig {
    /// Creates a new builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Synthesis timeout as a duration.
    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    /// Progress refresh period as a duration.
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }
}
