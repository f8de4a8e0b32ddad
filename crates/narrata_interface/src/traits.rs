//! Trait definitions for segmentation, synthesis and encoding.

use async_trait::async_trait;
use narrata_core::{
    AudioClip, GenerationParams, ImageAsset, Scene, Timeline, VideoArtifact, VideoClip,
};
use narrata_error::NarrataResult;

/// Splits narrative text into ordered scenes.
///
/// Implementations may return an empty list or a single catch-all scene
/// when the text cannot be analysed; returning an error fails the stage.
#[async_trait]
pub trait SceneSegmenter: Send + Sync {
    /// Segment `text` into scenes in narrative order.
    async fn segment(&self, text: &str) -> NarrataResult<Vec<Scene>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Produces a still image for a scene.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Synthesize the scene's image.
    async fn synthesize_image(
        &self,
        scene: &Scene,
        params: &GenerationParams,
    ) -> NarrataResult<ImageAsset>;

    /// Provider name for logs.
    fn provider_name(&self) -> &str;
}

/// Produces narration audio for a scene.
#[async_trait]
pub trait AudioSynthesizer: Send + Sync {
    /// Synthesize narration of the scene's text.
    async fn synthesize_audio(
        &self,
        scene: &Scene,
        params: &GenerationParams,
    ) -> NarrataResult<AudioClip>;

    /// Provider name for logs.
    fn provider_name(&self) -> &str;
}

/// Turns a scene's still image into a short motion clip.
#[async_trait]
pub trait VideoSynthesizer: Send + Sync {
    /// Animate `image`.
    async fn animate(
        &self,
        image: &ImageAsset,
        scene: &Scene,
        params: &GenerationParams,
    ) -> NarrataResult<VideoClip>;

    /// Provider name for logs.
    fn provider_name(&self) -> &str;
}

/// Renders a composed timeline into a container.
#[async_trait]
pub trait TimelineEncoder: Send + Sync {
    /// Encode the timeline, burning in `subtitles` (SRT text) when given.
    async fn encode(
        &self,
        timeline: &Timeline,
        subtitles: Option<&str>,
    ) -> NarrataResult<VideoArtifact>;

    /// Encode a black, silent clip of the given length and frame.
    async fn encode_blank(
        &self,
        duration_seconds: f64,
        width: u32,
        height: u32,
        fps: u32,
    ) -> NarrataResult<VideoArtifact>;

    /// Encoder name for logs.
    fn name(&self) -> &str;
}
