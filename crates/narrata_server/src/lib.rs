//! HTTP surface for narrata.
//!
//! Exposes project CRUD, pipeline start and stop, progress polling and a
//! websocket progress stream, artifact download, batch submission and a
//! segmentation preview on top of a shared [`ApiState`].
//!
//! ```rust,no_run
//! use narrata_server::{ApiState, ServerConfig, serve};
//! # async fn run(runner: narrata_pipeline::PipelineRunner) -> narrata_error::NarrataResult<()> {
//! serve(&ServerConfig::default(), ApiState::new(runner)).await
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analysis;
mod api;
mod batches;
mod config;
mod error;
mod models;
mod projects;
mod server;
mod state;
mod ws;

pub use api::create_router;
pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{ApiError, status_for};
pub use models::{
    AnalyzeTextRequest, AnalyzeTextResponse, BatchRequest, CreateProjectRequest, HealthResponse,
    RunResponse, UpdateProjectRequest,
};
pub use server::{bind, serve, serve_with_shutdown};
pub use state::ApiState;
