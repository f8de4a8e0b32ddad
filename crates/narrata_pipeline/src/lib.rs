//! Generation pipeline orchestration for narrata.
//!
//! - [`SceneSupervisor`] runs each synthesis call under a timeout inside a
//!   bounded worker pool and substitutes placeholders on failure
//! - [`PipelineRunner`] drives one project through its stages
//! - [`BatchController`] runs many projects under a concurrency limit
//! - [`ProgressBroadcaster`] publishes read-only progress views
//!
//! All mutable project state lives in one [`ProjectStore`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod config;
mod metrics;
mod pipeline;
mod progress;
mod store;
mod supervisor;

pub use batch::BatchController;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use metrics::{MetricsSnapshot, PipelineMetrics};
pub use pipeline::{PipelineHandle, PipelineRunner, RunOutcome};
pub use progress::ProgressBroadcaster;
pub use store::ProjectStore;
pub use supervisor::{SceneRecorder, SceneSupervisor, SynthesisPool};
