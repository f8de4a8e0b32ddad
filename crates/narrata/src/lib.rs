//! narrata turns narrative text into a narrated video.
//!
//! Text is split into scenes, each scene gets an image and narration from
//! remote collaborators (placeholders stand in for anything that fails),
//! and the tracks are composed into one MP4.
//!
//! This crate loads [`NarrataConfig`], wires the workspace crates into a
//! [`PipelineRunner`] and hosts the `narrata` binary.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use narrata::{NarrataConfig, ProjectStore, build_runner, render_file};
//!
//! # async fn run() -> narrata::NarrataResult<()> {
//! let config = NarrataConfig::load(None)?;
//! let runner = build_runner(&config, ProjectStore::new())?;
//! let outcome = render_file(&runner, "story.txt".as_ref(), None, "story.mp4".as_ref()).await?;
//! println!("completed: {}", outcome.is_completed());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `narrata_error` - Error types
//! - `narrata_core` - Scenes, projects, timelines
//! - `narrata_interface` - Collaborator traits
//! - `narrata_storage` - Content-addressed artifact storage
//! - `narrata_media` - Placeholders, track balancing, composition
//! - `narrata_services` - Segmenters and remote synthesizers
//! - `narrata_pipeline` - Supervisor, pipeline, batches, progress
//! - `narrata_server` - HTTP and websocket surface

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod config;
mod jobs;
mod observability;

pub use app::{build_runner, build_state, encoder, segmenter};
pub use config::{LoggingConfig, NarrataConfig, StorageConfig};
pub use jobs::{batch_files, load_project, render_file};
pub use observability::{
    ObservabilityConfig, init_observability_with_config, shutdown_observability,
};

pub use narrata_core::*;
pub use narrata_error::*;
pub use narrata_interface::*;
pub use narrata_media::*;
pub use narrata_pipeline::*;
pub use narrata_server::{ApiState, ServerConfig, create_router, serve, serve_with_shutdown};
pub use narrata_services::*;
pub use narrata_storage::*;
