//! A live server over mock collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use narrata_core::{AudioClip, GenerationParams, ImageAsset, Scene, Timeline, VideoArtifact};
use narrata_error::NarrataResult;
use narrata_interface::{AudioSynthesizer, ImageSynthesizer, TimelineEncoder};
use narrata_media::{ComposerConfig, FallbackConfig, FallbackSynthesizer, TimelineComposer};
use narrata_pipeline::{
    PipelineConfig, PipelineRunner, ProgressBroadcaster, ProjectStore, SceneSupervisor,
};
use narrata_server::{ApiState, ServerConfig, bind, serve_with_shutdown};
use narrata_services::ParagraphSegmenter;
use narrata_storage::FileSystemStorage;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Image and narration synthesizer that sleeps before answering.
pub struct SlowSynthesizer {
    delay: Duration,
    fallback: FallbackSynthesizer,
}

impl SlowSynthesizer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fallback: FallbackSynthesizer::new(FallbackConfig::default()).unwrap(),
        }
    }
}

#[async_trait]
impl ImageSynthesizer for SlowSynthesizer {
    async fn synthesize_image(
        &self,
        scene: &Scene,
        _params: &GenerationParams,
    ) -> NarrataResult<ImageAsset> {
        tokio::time::sleep(self.delay).await;
        Ok(ImageAsset::new(scene.id().as_bytes().to_vec(), "image/png"))
    }

    fn provider_name(&self) -> &str {
        "slow"
    }
}

#[async_trait]
impl AudioSynthesizer for SlowSynthesizer {
    async fn synthesize_audio(
        &self,
        _scene: &Scene,
        _params: &GenerationParams,
    ) -> NarrataResult<AudioClip> {
        let clip = self.fallback.silence_for(1.0);
        Ok(AudioClip::new(clip.bytes().clone(), "audio/wav", None))
    }

    fn provider_name(&self) -> &str {
        "slow"
    }
}

/// Encodes a timeline as a short text body.
pub struct TextEncoder;

#[async_trait]
impl TimelineEncoder for TextEncoder {
    async fn encode(
        &self,
        timeline: &Timeline,
        _subtitles: Option<&str>,
    ) -> NarrataResult<VideoArtifact> {
        let body = format!("segments={}", timeline.segments.len()).into_bytes();
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
        "text"
    }
}

/// A running server and the store behind it.
pub struct TestServer {
    pub base: String,
    pub ws_base: String,
    pub store: ProjectStore,
    pub client: reqwest::Client,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Polls until the project reaches a terminal status.
    pub async fn wait_terminal(&self, id: &str) -> serde_json::Value {
        for _ in 0..200 {
            let project: serde_json::Value = self
                .client
                .get(self.url(&format!("/projects/{}", id)))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            let status = project["status"].as_str().unwrap_or_default().to_string();
            if status == "completed" || status == "failed" {
                return project;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("project {} never finished", id);
    }
}

/// Starts a server whose image synthesis takes `image_delay` per scene.
pub async fn spawn_server(image_delay: Duration) -> TestServer {
    let dir = TempDir::new().unwrap();
    let store = ProjectStore::new();
    let synth = Arc::new(SlowSynthesizer::new(image_delay));
    let fallback = Arc::new(FallbackSynthesizer::new(FallbackConfig::default()).unwrap());
    let config = PipelineConfig::default();
    let supervisor = SceneSupervisor::new(synth.clone(), synth, fallback, &config);
    let composer = TimelineComposer::new(ComposerConfig::default(), Arc::new(TextEncoder));
    let runner = PipelineRunner::new(
        store.clone(),
        Arc::new(ParagraphSegmenter::new().unwrap()),
        supervisor,
        composer,
        Arc::new(FileSystemStorage::new(dir.path()).unwrap()),
        config,
    );
    let state = ApiState::new(runner)
        .with_progress(ProgressBroadcaster::new(store.clone(), Duration::from_millis(20)));

    let listener = bind(&ServerConfig::default().with_port(0u16)).await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(serve_with_shutdown(listener, state, std::future::pending()));

    TestServer {
        base: format!("http://{}", address),
        ws_base: format!("ws://{}", address),
        store,
        client: reqwest::Client::new(),
        _dir: dir,
    }
}

pub const STORY: &str = "Mara climbed the hill at dawn.\n\n\
    The village bells rang below her.\n\n\
    Mara turned back toward home.";
