//! Mock collaborators and a ready-wired runner.

#![allow(dead_code)]

use async_trait::async_trait;
use narrata_core::{
    AudioClip, GenerationParams, ImageAsset, ProjectId, ProjectState, Scene, Timeline,
    VideoArtifact, VideoClip,
};
use narrata_error::{HttpError, NarrataResult, SynthesisError, SynthesisErrorKind};
use narrata_interface::{
    AudioSynthesizer, ImageSynthesizer, SceneSegmenter, TimelineEncoder, VideoSynthesizer,
};
use narrata_media::{ComposerConfig, FallbackConfig, FallbackSynthesizer, TimelineComposer};
use narrata_pipeline::{PipelineConfig, PipelineRunner, ProjectStore, SceneSupervisor};
use narrata_storage::FileSystemStorage;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Seconds of audio each mock narration clip lasts.
pub const CLIP_SECONDS: f64 = 2.0;

/// How a mock collaborator responds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeed.
    Success,
    /// Always fail with a retryable error.
    Fail,
    /// Fail the first `n` calls, then succeed.
    FailThenSucceed(usize),
    /// Never return.
    Hang,
    /// Panic inside the call.
    Panic,
}

type Hook = Arc<dyn Fn(&Scene) + Send + Sync>;

/// A synthesizer for every media kind with call counters.
pub struct MockSynthesizer {
    behavior: MockBehavior,
    delay: Duration,
    hook: Option<Hook>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fallback: FallbackSynthesizer,
}

impl MockSynthesizer {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            hook: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            fallback: FallbackSynthesizer::new(FallbackConfig::default()).unwrap(),
        }
    }

    /// Each call takes at least `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Runs `hook` at the start of every call.
    pub fn with_hook(mut self, hook: impl Fn(&Scene) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn behave(&self, scene: &Scene) -> NarrataResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(hook) = &self.hook {
            hook(scene);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = match self.behavior {
            MockBehavior::Success => Ok(()),
            MockBehavior::Fail => Err(remote_failure()),
            MockBehavior::FailThenSucceed(n) if call <= n => Err(remote_failure()),
            MockBehavior::FailThenSucceed(_) => Ok(()),
            MockBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
            MockBehavior::Panic => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                panic!("mock synthesizer panicked");
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn remote_failure() -> narrata_error::NarrataError {
    SynthesisError::new(SynthesisErrorKind::Remote("mock failure".to_string())).into()
}

#[async_trait]
impl ImageSynthesizer for MockSynthesizer {
    async fn synthesize_image(
        &self,
        scene: &Scene,
        _params: &GenerationParams,
    ) -> NarrataResult<ImageAsset> {
        self.behave(scene).await?;
        Ok(ImageAsset::new(scene.id().as_bytes().to_vec(), "image/png"))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl AudioSynthesizer for MockSynthesizer {
    async fn synthesize_audio(
        &self,
        scene: &Scene,
        _params: &GenerationParams,
    ) -> NarrataResult<AudioClip> {
        self.behave(scene).await?;
        let silence = self.fallback.silence_for(CLIP_SECONDS);
        Ok(AudioClip::new(silence.bytes().clone(), "audio/wav", None))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl VideoSynthesizer for MockSynthesizer {
    async fn animate(
        &self,
        image: &ImageAsset,
        scene: &Scene,
        _params: &GenerationParams,
    ) -> NarrataResult<VideoClip> {
        self.behave(scene).await?;
        Ok(VideoClip::new(image.bytes().clone(), "video/mp4", Some(1.0)))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

/// Splits on blank lines. Text containing `FAIL` errors; `EMPTY` yields nothing.
#[derive(Debug, Default)]
pub struct MockSegmenter {
    pub reversed: bool,
}

#[async_trait]
impl SceneSegmenter for MockSegmenter {
    async fn segment(&self, text: &str) -> NarrataResult<Vec<Scene>> {
        if text.contains("FAIL") {
            return Err(HttpError::new("segmenter offline").into());
        }
        if text.trim() == "EMPTY" {
            return Ok(Vec::new());
        }
        let mut scenes: Vec<Scene> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .enumerate()
            .map(|(i, p)| Scene::new(format!("scene_{}", i + 1), i, p))
            .collect();
        if self.reversed {
            scenes.reverse();
        }
        Ok(scenes)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Records every timeline it is asked to encode.
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    pub timelines: parking_lot::Mutex<Vec<Timeline>>,
    /// Removed from its store on the next encode.
    pub remove_on_encode: parking_lot::Mutex<Option<(ProjectStore, ProjectId)>>,
}

#[async_trait]
impl TimelineEncoder for RecordingEncoder {
    async fn encode(
        &self,
        timeline: &Timeline,
        _subtitles: Option<&str>,
    ) -> NarrataResult<VideoArtifact> {
        self.timelines.lock().push(timeline.clone());
        if let Some((store, id)) = self.remove_on_encode.lock().take() {
            store.remove(&id);
        }
        let body = format!("video:{}", timeline.segments.len()).into_bytes();
        Ok(VideoArtifact::mp4(body, timeline.total_duration_seconds()))
    }

    async fn encode_blank(
        &self,
        duration_seconds: f64,
        _width: u32,
        _height: u32,
        _fps: u32,
    ) -> NarrataResult<VideoArtifact> {
        Ok(VideoArtifact::mp4(b"blank".to_vec(), duration_seconds))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// A runner wired to mocks and temporary storage.
pub struct Harness {
    pub runner: PipelineRunner,
    pub store: ProjectStore,
    pub images: Arc<MockSynthesizer>,
    pub audio: Arc<MockSynthesizer>,
    pub video: Arc<MockSynthesizer>,
    pub encoder: Arc<RecordingEncoder>,
    pub dir: TempDir,
}

impl Harness {
    pub fn new(images: MockSynthesizer, audio: MockSynthesizer) -> Self {
        Self::build(images, audio, PipelineConfig::default(), MockSegmenter::default())
    }

    pub fn build(
        images: MockSynthesizer,
        audio: MockSynthesizer,
        config: PipelineConfig,
        segmenter: MockSegmenter,
    ) -> Self {
        Self::build_with_store(ProjectStore::new(), images, audio, config, segmenter)
    }

    pub fn build_with_store(
        store: ProjectStore,
        images: MockSynthesizer,
        audio: MockSynthesizer,
        config: PipelineConfig,
        segmenter: MockSegmenter,
    ) -> Self {
        let dir = TempDir::new().unwrap();
        let images = Arc::new(images);
        let audio = Arc::new(audio);
        let video = Arc::new(MockSynthesizer::new(MockBehavior::Success));
        let encoder = Arc::new(RecordingEncoder::default());
        let fallback = Arc::new(FallbackSynthesizer::new(FallbackConfig::default()).unwrap());

        let supervisor = SceneSupervisor::new(images.clone(), audio.clone(), fallback, &config)
            .with_video(video.clone())
            .with_timeout(Duration::from_millis(500));
        let composer = TimelineComposer::new(ComposerConfig::default(), encoder.clone());
        let storage = Arc::new(FileSystemStorage::new(dir.path()).unwrap());
        let runner = PipelineRunner::new(
            store.clone(),
            Arc::new(segmenter),
            supervisor,
            composer,
            storage,
            config,
        );

        Self {
            runner,
            store,
            images,
            audio,
            video,
            encoder,
            dir,
        }
    }

    /// Inserts a project with the given text.
    pub fn project(&self, id: &str, text: &str) -> ProjectId {
        let id = ProjectId::from(id);
        self.store
            .insert(ProjectState::new(id.clone(), format!("Project {}", id)).with_text(text));
        id
    }
}

/// Text with `n` scenes.
pub fn story(n: usize) -> String {
    (1..=n)
        .map(|i| format!("Scene number {} happens here.", i))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Regular files anywhere under `root`.
pub fn files_under(root: &std::path::Path) -> usize {
    std::fs::read_dir(root)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| {
                    let path = entry.path();
                    if path.is_dir() { files_under(&path) } else { 1 }
                })
                .sum()
        })
        .unwrap_or(0)
}
