//! Per-scene synthesis with timeouts, retries and fallback substitution.

use crate::{PipelineConfig, PipelineMetrics, ProjectStore};
use narrata_core::{
    AudioClip, GenerationOutcome, GenerationParams, ImageAsset, MediaKind, ProjectId, Scene,
    StepStatus, VideoClip, Visual,
};
use narrata_error::{NarrataError, NarrataErrorKind, NarrataResult, SynthesisError, SynthesisErrorKind};
use narrata_interface::{AudioSynthesizer, ImageSynthesizer, VideoSynthesizer};
use narrata_media::{FallbackSynthesizer, decode_duration};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_retry2::strategy::FixedInterval;
use tokio_retry2::{Retry, RetryError};

/// Bounds how many synthesis calls run at once, across all projects.
#[derive(Debug, Clone)]
pub struct SynthesisPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl SynthesisPool {
    /// A pool admitting `size` concurrent calls (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Configured pool size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    async fn acquire(&self) -> Result<OwnedSemaphorePermit, SynthesisError> {
        self.permits.clone().acquire_owned().await.map_err(|_| {
            SynthesisError::new(SynthesisErrorKind::Unavailable(
                "synthesis pool closed".to_string(),
            ))
        })
    }
}

/// Writes one scene's step statuses and counters into the project state.
#[derive(Debug, Clone)]
pub struct SceneRecorder {
    store: ProjectStore,
    project_id: ProjectId,
    index: usize,
}

impl SceneRecorder {
    /// Recorder for the scene at `index` of the project.
    pub fn new(store: ProjectStore, project_id: ProjectId, index: usize) -> Self {
        Self {
            store,
            project_id,
            index,
        }
    }

    fn set(&self, kind: MediaKind, status: StepStatus, error: Option<&str>) {
        self.store.update(&self.project_id, |state| {
            match status {
                StepStatus::Completed => state.stats.generated.increment(kind),
                StepStatus::Fallback => state.stats.failed.increment(kind),
                _ => {}
            }
            if let Some(record) = state.scenes.get_mut(self.index) {
                *record.step_mut(kind) = status;
                if let Some(error) = error {
                    record.last_error = Some(error.to_string());
                }
            }
        });
    }

    /// Marks the step in flight.
    pub fn processing(&self, kind: MediaKind) {
        self.set(kind, StepStatus::Processing, None);
    }

    /// Marks the step done with real media.
    pub fn completed(&self, kind: MediaKind) {
        self.set(kind, StepStatus::Completed, None);
    }

    /// Marks the step done with a placeholder.
    pub fn fallback(&self, kind: MediaKind, reason: &str) {
        self.set(kind, StepStatus::Fallback, Some(reason));
    }
}

/// Runs collaborator calls for a scene and never lets a failure escape.
///
/// Each attempt runs as its own task under the pool and a timeout, so a
/// hung collaborator is abandoned and a panicking one becomes a
/// [`GenerationOutcome::Failure`]. Retryable failures are attempted again
/// immediately up to the configured count.
#[derive(Clone)]
pub struct SceneSupervisor {
    images: Arc<dyn ImageSynthesizer>,
    audio: Arc<dyn AudioSynthesizer>,
    video: Option<Arc<dyn VideoSynthesizer>>,
    fallback: Arc<FallbackSynthesizer>,
    pool: SynthesisPool,
    timeout: Duration,
    attempts: u32,
    metrics: PipelineMetrics,
}

impl std::fmt::Debug for SceneSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneSupervisor")
            .field("images", &self.images.provider_name())
            .field("audio", &self.audio.provider_name())
            .field("video", &self.video.as_ref().map(|v| v.provider_name().to_string()))
            .field("pool", &self.pool.size())
            .field("timeout", &self.timeout)
            .field("attempts", &self.attempts)
            .finish()
    }
}

impl SceneSupervisor {
    /// Supervisor with pool size, timeout and attempts taken from `config`.
    pub fn new(
        images: Arc<dyn ImageSynthesizer>,
        audio: Arc<dyn AudioSynthesizer>,
        fallback: Arc<FallbackSynthesizer>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            images,
            audio,
            video: None,
            fallback,
            pool: SynthesisPool::new(*config.worker_pool_size()),
            timeout: config.synthesis_timeout(),
            attempts: (*config.retry_attempts()).max(1),
            metrics: PipelineMetrics::new(),
        }
    }

    /// Enables image-to-video through `video`.
    pub fn with_video(mut self, video: Arc<dyn VideoSynthesizer>) -> Self {
        self.video = Some(video);
        self
    }

    /// Shares an existing pool.
    pub fn with_pool(mut self, pool: SynthesisPool) -> Self {
        self.pool = pool;
        self
    }

    /// Overrides the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the attempt count.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Reports fallbacks into `metrics`.
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Placeholder source.
    pub fn fallback(&self) -> &Arc<FallbackSynthesizer> {
        &self.fallback
    }

    /// Worker pool.
    pub fn pool(&self) -> &SynthesisPool {
        &self.pool
    }

    /// Counters this supervisor reports into.
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Whether an image-to-video collaborator is configured.
    pub fn supports_video(&self) -> bool {
        self.video.is_some()
    }

    /// Calls the image collaborator.
    pub async fn generate_image(
        &self,
        scene: &Arc<Scene>,
        params: &GenerationParams,
    ) -> GenerationOutcome<ImageAsset> {
        let images = self.images.clone();
        let scene_arc = scene.clone();
        let params = params.clone();
        self.supervise(MediaKind::Image, scene, move || {
            let images = images.clone();
            let scene = scene_arc.clone();
            let params = params.clone();
            async move { images.synthesize_image(&scene, &params).await }
        })
        .await
    }

    /// Calls the narration collaborator.
    ///
    /// The success duration is the decoded clip length when the clip is WAV,
    /// otherwise what the collaborator declared.
    pub async fn generate_audio(
        &self,
        scene: &Arc<Scene>,
        params: &GenerationParams,
    ) -> GenerationOutcome<AudioClip> {
        let audio = self.audio.clone();
        let scene_arc = scene.clone();
        let params = params.clone();
        let outcome = self
            .supervise(MediaKind::Audio, scene, move || {
                let audio = audio.clone();
                let scene = scene_arc.clone();
                let params = params.clone();
                async move { audio.synthesize_audio(&scene, &params).await }
            })
            .await;

        match outcome {
            GenerationOutcome::Success { payload, .. } => {
                let duration = decode_duration(&payload)
                    .ok()
                    .or(*payload.duration_seconds());
                GenerationOutcome::Success {
                    payload,
                    duration_seconds: duration,
                }
            }
            failure => failure,
        }
    }

    /// Calls the image-to-video collaborator.
    pub async fn generate_video(
        &self,
        image: &ImageAsset,
        scene: &Arc<Scene>,
        params: &GenerationParams,
    ) -> GenerationOutcome<VideoClip> {
        let Some(video) = self.video.clone() else {
            return GenerationOutcome::failure(SynthesisError::new(
                SynthesisErrorKind::Unavailable("no video synthesizer configured".to_string()),
            ));
        };
        let image = image.clone();
        let scene_arc = scene.clone();
        let params = params.clone();
        let outcome = self
            .supervise(MediaKind::Video, scene, move || {
                let video = video.clone();
                let image = image.clone();
                let scene = scene_arc.clone();
                let params = params.clone();
                async move { video.animate(&image, &scene, &params).await }
            })
            .await;
        match outcome {
            GenerationOutcome::Success { payload, .. } => {
                let duration = *payload.duration_seconds();
                GenerationOutcome::Success {
                    payload,
                    duration_seconds: duration,
                }
            }
            failure => failure,
        }
    }

    /// The scene's image, or the placeholder if synthesis failed.
    pub async fn resolve_image(
        &self,
        scene: &Arc<Scene>,
        params: &GenerationParams,
        recorder: &SceneRecorder,
    ) -> ImageAsset {
        recorder.processing(MediaKind::Image);
        let outcome = self.generate_image(scene, params).await;
        self.settle(MediaKind::Image, scene, recorder, outcome, |_| self.fallback.image())
    }

    /// The scene's narration, or silence sized to its text.
    pub async fn resolve_audio(
        &self,
        scene: &Arc<Scene>,
        params: &GenerationParams,
        recorder: &SceneRecorder,
    ) -> AudioClip {
        recorder.processing(MediaKind::Audio);
        let outcome = self.generate_audio(scene, params).await;
        self.settle(MediaKind::Audio, scene, recorder, outcome, |_| {
            self.fallback.silence(scene.text())
        })
    }

    /// A motion clip over `image`, or the still itself.
    pub async fn resolve_video(
        &self,
        image: ImageAsset,
        scene: &Arc<Scene>,
        params: &GenerationParams,
        recorder: &SceneRecorder,
    ) -> Visual {
        recorder.processing(MediaKind::Video);
        let outcome = self
            .generate_video(&image, scene, params)
            .await
            .map(|clip| Visual::Motion {
                clip,
                poster: image.clone(),
            });
        self.settle(MediaKind::Video, scene, recorder, outcome, |_| {
            self.fallback.video(image.clone())
        })
    }

    fn settle<T>(
        &self,
        kind: MediaKind,
        scene: &Scene,
        recorder: &SceneRecorder,
        outcome: GenerationOutcome<T>,
        substitute: impl FnOnce(&str) -> T,
    ) -> T {
        match outcome.reason() {
            None => recorder.completed(kind),
            Some(reason) => {
                tracing::warn!(
                    scene_id = %scene.id(),
                    kind = %kind,
                    reason = %reason,
                    "Synthesis failed, substituting placeholder"
                );
                self.metrics.record_fallback();
                recorder.fallback(kind, reason);
            }
        }
        outcome.unwrap_or_else(substitute)
    }

    #[tracing::instrument(skip(self, scene, call), fields(scene_id = %scene.id(), kind = %kind))]
    async fn supervise<T, F, Fut>(
        &self,
        kind: MediaKind,
        scene: &Scene,
        call: F,
    ) -> GenerationOutcome<T>
    where
        T: Send + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = NarrataResult<T>> + Send + 'static,
    {
        let strategy = FixedInterval::from_millis(0).take(self.attempts.saturating_sub(1) as usize);
        let result = Retry::spawn(strategy, || {
            let attempt = guarded(self.pool.clone(), self.timeout, call());
            async move {
                match attempt.await {
                    Ok(payload) => Ok(payload),
                    Err(e) if e.is_retryable() => {
                        tracing::debug!(error = %e, "Synthesis attempt failed, may retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => Err(RetryError::Permanent(e)),
                }
            }
        })
        .await;

        match result {
            Ok(payload) => GenerationOutcome::success(payload),
            Err(e) => GenerationOutcome::failure(e.kind),
        }
    }
}

/// One attempt: wait for a pool slot, then run the call as its own task.
async fn guarded<T, Fut>(
    pool: SynthesisPool,
    timeout: Duration,
    call: Fut,
) -> Result<T, SynthesisError>
where
    T: Send + 'static,
    Fut: Future<Output = NarrataResult<T>> + Send + 'static,
{
    let _permit = pool.acquire().await?;
    let task = tokio::spawn(call);
    let abort = task.abort_handle();

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(payload))) => Ok(payload),
        Ok(Ok(Err(e))) => Err(as_synthesis_error(e)),
        Ok(Err(join)) => Err(SynthesisError::new(SynthesisErrorKind::Panicked(
            join.to_string(),
        ))),
        Err(_) => {
            abort.abort();
            Err(SynthesisError::new(SynthesisErrorKind::Timeout(
                timeout.as_secs(),
            )))
        }
    }
}

fn as_synthesis_error(err: NarrataError) -> SynthesisError {
    match err.kind() {
        NarrataErrorKind::Synthesis(e) => e.clone(),
        other => SynthesisError::new(SynthesisErrorKind::Remote(other.to_string())),
    }
}
