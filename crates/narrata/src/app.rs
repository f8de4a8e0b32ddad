//! Building a runner from configuration.

use crate::NarrataConfig;
use narrata_error::NarrataResult;
use narrata_interface::SceneSegmenter;
use narrata_media::{FallbackSynthesizer, FfmpegEncoder, OutputValidator, TimelineComposer};
use narrata_pipeline::{PipelineRunner, ProjectStore, SceneSupervisor};
use narrata_server::ApiState;
use narrata_services::{ParagraphSegmenter, RemoteSegmenter, RemoteSynthesizer};
use narrata_storage::FileSystemStorage;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Chooses the scene segmenter.
///
/// A configured `services.segmenter_url` selects the remote service;
/// otherwise paragraphs are split locally.
pub fn segmenter(config: &NarrataConfig) -> NarrataResult<Arc<dyn SceneSegmenter>> {
    let services = config.services();
    Ok(match services.segmenter_url() {
        Some(url) => Arc::new(RemoteSegmenter::new(
            url.clone(),
            *services.request_timeout_secs(),
        )?),
        None => Arc::new(ParagraphSegmenter::new()?),
    })
}

/// Resolves the ffmpeg binary, keeping the configured name when it is not
/// on `PATH` so encoding degrades at run time instead of at startup.
pub fn encoder(config: &NarrataConfig) -> FfmpegEncoder {
    let name = config.composer().ffmpeg_path();
    FfmpegEncoder::locate(name).unwrap_or_else(|e| {
        warn!(error = %e, "ffmpeg not found, artifacts will be placeholders");
        FfmpegEncoder::new(name)
    })
}

/// Wires collaborators, storage and the store into a runner.
///
/// # Errors
///
/// Returns an error if an HTTP client or the storage directory cannot be
/// created.
#[instrument(skip(config, store), fields(storage = %config.storage().path().display()))]
pub fn build_runner(config: &NarrataConfig, store: ProjectStore) -> NarrataResult<PipelineRunner> {
    let fallback = Arc::new(FallbackSynthesizer::new(config.fallback().clone())?);
    let remote = Arc::new(RemoteSynthesizer::new(config.services())?);

    let mut supervisor =
        SceneSupervisor::new(remote.clone(), remote.clone(), fallback, config.pipeline());
    if remote.supports_video() {
        supervisor = supervisor.with_video(remote);
    }

    let composer = TimelineComposer::new(config.composer().clone(), Arc::new(encoder(config)));
    let storage = Arc::new(FileSystemStorage::new(config.storage().path())?);

    let runner = PipelineRunner::new(
        store,
        segmenter(config)?,
        supervisor,
        composer,
        storage,
        config.pipeline().clone(),
    )
    .with_validator(OutputValidator::new(config.validation().clone()));
    info!(runner = ?runner, "Pipeline runner ready");
    Ok(runner)
}

/// Shared state for the HTTP surface.
///
/// # Errors
///
/// Same as [`build_runner`].
pub fn build_state(config: &NarrataConfig) -> NarrataResult<ApiState> {
    Ok(ApiState::new(build_runner(config, ProjectStore::new())?))
}
