//! HTTP clients for remote segmentation and synthesis services.

use crate::ServicesConfig;
use async_trait::async_trait;
use narrata_core::{AudioClip, GenerationParams, ImageAsset, MediaKind, Scene, VideoClip};
use narrata_error::{
    HttpError, JsonError, NarrataResult, SynthesisError, SynthesisErrorKind,
};
use narrata_interface::{AudioSynthesizer, ImageSynthesizer, SceneSegmenter, VideoSynthesizer};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Response header carrying the clip length, when the service knows it.
const DURATION_HEADER: &str = "x-duration-seconds";

fn http_client(timeout_secs: u64) -> NarrataResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)).into())
}

/// Extracts the JSON document from a response that may wrap it in prose or
/// a fenced code block.
///
/// # Examples
///
/// ```
/// use narrata_services::json_payload;
///
/// let content = "Here you go:\n```json\n{\"scenes\": []}\n```";
/// assert_eq!(json_payload(content), "{\"scenes\": []}");
/// assert_eq!(json_payload(" [1, 2] "), "[1, 2]");
/// ```
pub fn json_payload(content: &str) -> &str {
    let content = content.trim();
    if let Some(start) = content.find("```") {
        let after = &content[start + 3..];
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after[body_start..];
        let body_end = body.find("```").unwrap_or(body.len());
        return body[..body_end].trim();
    }
    match content.find(['{', '[']) {
        Some(start) => &content[start..],
        None => content,
    }
}

/// A scene as described by the segmentation service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteScene {
    /// Narration text.
    #[serde(default, alias = "description", alias = "content")]
    pub text: String,
    /// Characters, as a list or a comma-separated string.
    #[serde(default)]
    pub characters: Characters,
    /// Where the scene takes place.
    #[serde(default)]
    pub setting: Option<String>,
    /// Emotional tone.
    #[serde(default)]
    pub mood: Option<String>,
    /// Action intensity; clamped into `[0, 1]`.
    #[serde(default)]
    pub action_level: Option<f32>,
}

/// Character list in either wire shape.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum Characters {
    /// A JSON array of names.
    List(Vec<String>),
    /// A single comma-separated string.
    Joined(String),
    /// Absent.
    #[default]
    None,
}

impl Characters {
    fn into_vec(self) -> Vec<String> {
        match self {
            Characters::List(names) => names,
            Characters::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect(),
            Characters::None => Vec::new(),
        }
    }
}

impl RemoteScene {
    fn into_scene(self, index: usize) -> NarrataResult<Scene> {
        let mut builder = Scene::builder();
        builder
            .id(format!("scene_{}", index + 1))
            .order(index)
            .text(self.text)
            .characters(self.characters.into_vec())
            .action_level(self.action_level.unwrap_or(0.0));
        if let Some(setting) = self.setting.filter(|s| !s.trim().is_empty()) {
            builder.setting(setting);
        }
        if let Some(mood) = self.mood.filter(|m| !m.trim().is_empty()) {
            builder.mood(mood);
        }
        Ok(builder.build()?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SplitResponse {
    Wrapped { scenes: Vec<RemoteScene> },
    Bare(Vec<RemoteScene>),
}

impl SplitResponse {
    fn into_scenes(self) -> Vec<RemoteScene> {
        match self {
            SplitResponse::Wrapped { scenes } | SplitResponse::Bare(scenes) => scenes,
        }
    }
}

/// Segments text by calling `POST {base_url}/split-scenes`.
///
/// Scenes with blank text are dropped; an empty result is passed through so
/// the pipeline can fail the stage.
#[derive(Debug, Clone)]
pub struct RemoteSegmenter {
    client: Client,
    base_url: String,
}

impl RemoteSegmenter {
    /// Client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> NarrataResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "Creating remote segmenter");
        Ok(Self {
            client: http_client(timeout_secs)?,
            base_url,
        })
    }
}

#[async_trait]
impl SceneSegmenter for RemoteSegmenter {
    #[instrument(skip(self, text), fields(base_url = %self.base_url, chars = text.len()))]
    async fn segment(&self, text: &str) -> NarrataResult<Vec<Scene>> {
        let url = format!("{}/split-scenes", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Segmentation request failed");
                HttpError::new(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::new(format!("Failed to read response: {}", e)))?;
        if !status.is_success() {
            error!(status = %status, body = %body, "Segmentation service returned error");
            return Err(HttpError::with_status(status.as_u16(), body).into());
        }

        let parsed: SplitResponse = serde_json::from_str(json_payload(&body)).map_err(|e| {
            error!(error = %e, "Failed to parse segmentation response");
            JsonError::new(format!("Failed to parse scenes: {}", e))
        })?;

        let scenes = parsed
            .into_scenes()
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .enumerate()
            .map(|(i, s)| s.into_scene(i))
            .collect::<NarrataResult<Vec<_>>>()?;

        debug!(scenes = scenes.len(), "Received scenes");
        Ok(scenes)
    }

    fn name(&self) -> &str {
        "remote"
    }
}

/// JSON body sent to image and narration endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisRequest {
    /// Scene identifier.
    pub scene_id: String,
    /// What is being requested.
    pub kind: MediaKind,
    /// Image prompt.
    pub prompt: String,
    /// Narration text.
    pub narration: String,
    /// Visual style.
    pub style: String,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
    /// Narration speed multiplier.
    pub speech_rate: f32,
    /// Narration language.
    pub language: String,
    /// Narration voice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl SynthesisRequest {
    /// Request for one scene.
    pub fn new(kind: MediaKind, scene: &Scene, params: &GenerationParams) -> Self {
        Self {
            scene_id: scene.id().clone(),
            kind,
            prompt: params.prompt().clone(),
            narration: params.narration().clone(),
            style: params.style().clone(),
            width: *params.width(),
            height: *params.height(),
            speech_rate: *params.speech_rate(),
            language: params.language().clone(),
            voice: params.voice().clone(),
        }
    }
}

struct Payload {
    bytes: Vec<u8>,
    mime_type: String,
    duration_seconds: Option<f64>,
}

/// Calls remote image, narration and image-to-video endpoints.
///
/// The response body is the media itself; its `Content-Type` becomes the
/// asset's MIME type. Endpoints not configured fail with
/// [`SynthesisErrorKind::Unavailable`].
#[derive(Debug, Clone)]
pub struct RemoteSynthesizer {
    client: Client,
    image_url: Option<String>,
    audio_url: Option<String>,
    video_url: Option<String>,
    timeout_secs: u64,
}

impl RemoteSynthesizer {
    /// Synthesizer using the endpoints in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ServicesConfig) -> NarrataResult<Self> {
        debug!(
            image = config.image_url().is_some(),
            audio = config.audio_url().is_some(),
            video = config.video_url().is_some(),
            "Creating remote synthesizer"
        );
        Ok(Self {
            client: http_client(*config.request_timeout_secs())?,
            image_url: config.image_url().clone(),
            audio_url: config.audio_url().clone(),
            video_url: config.video_url().clone(),
            timeout_secs: *config.request_timeout_secs(),
        })
    }

    /// Whether an image-to-video endpoint is configured.
    pub fn supports_video(&self) -> bool {
        self.video_url.is_some()
    }

    fn endpoint(&self, kind: MediaKind) -> NarrataResult<&str> {
        let url = match kind {
            MediaKind::Image => &self.image_url,
            MediaKind::Audio => &self.audio_url,
            MediaKind::Video => &self.video_url,
        };
        url.as_deref().ok_or_else(|| {
            SynthesisError::new(SynthesisErrorKind::Unavailable(format!(
                "no {} endpoint configured",
                kind
            )))
            .into()
        })
    }

    async fn send(
        &self,
        kind: MediaKind,
        request: reqwest::RequestBuilder,
    ) -> NarrataResult<Payload> {
        let response = request.send().await.map_err(|e| {
            warn!(kind = %kind, error = %e, "Synthesis request failed");
            if e.is_timeout() {
                SynthesisError::new(SynthesisErrorKind::Timeout(self.timeout_secs))
            } else {
                SynthesisError::new(SynthesisErrorKind::Remote(format!("Request failed: {}", e)))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(kind = %kind, status = %status, "Synthesis service returned error");
            return Err(SynthesisError::new(SynthesisErrorKind::Remote(format!(
                "{} returned {}: {}",
                kind, status, body
            )))
            .into());
        }

        let headers = response.headers();
        let mime_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| default_mime(kind).to_string());
        let duration_seconds = headers
            .get(DURATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0);

        let expected = format!("{}/", media_family(kind));
        if !mime_type.starts_with(&expected) {
            return Err(SynthesisError::new(SynthesisErrorKind::InvalidResponse(format!(
                "expected {}*, got {}",
                expected, mime_type
            )))
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::new(SynthesisErrorKind::Remote(format!("Failed to read body: {}", e))))?
            .to_vec();
        if bytes.is_empty() {
            return Err(SynthesisError::new(SynthesisErrorKind::InvalidResponse(
                "empty body".to_string(),
            ))
            .into());
        }

        debug!(kind = %kind, bytes = bytes.len(), mime = %mime_type, "Received media");
        Ok(Payload {
            bytes,
            mime_type,
            duration_seconds,
        })
    }

    async fn generate(
        &self,
        kind: MediaKind,
        scene: &Scene,
        params: &GenerationParams,
    ) -> NarrataResult<Payload> {
        let url = self.endpoint(kind)?;
        let request = self
            .client
            .post(url)
            .json(&SynthesisRequest::new(kind, scene, params));
        self.send(kind, request).await
    }
}

fn media_family(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Audio => "audio",
        MediaKind::Video => "video",
    }
}

fn default_mime(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image/png",
        MediaKind::Audio => "audio/wav",
        MediaKind::Video => "video/mp4",
    }
}

#[async_trait]
impl ImageSynthesizer for RemoteSynthesizer {
    #[instrument(skip(self, scene, params), fields(scene_id = %scene.id()))]
    async fn synthesize_image(
        &self,
        scene: &Scene,
        params: &GenerationParams,
    ) -> NarrataResult<ImageAsset> {
        let payload = self.generate(MediaKind::Image, scene, params).await?;
        Ok(ImageAsset::new(payload.bytes, payload.mime_type))
    }

    fn provider_name(&self) -> &str {
        "remote"
    }
}

#[async_trait]
impl AudioSynthesizer for RemoteSynthesizer {
    #[instrument(skip(self, scene, params), fields(scene_id = %scene.id()))]
    async fn synthesize_audio(
        &self,
        scene: &Scene,
        params: &GenerationParams,
    ) -> NarrataResult<AudioClip> {
        let payload = self.generate(MediaKind::Audio, scene, params).await?;
        Ok(AudioClip::new(
            payload.bytes,
            payload.mime_type,
            payload.duration_seconds,
        ))
    }

    fn provider_name(&self) -> &str {
        "remote"
    }
}

#[async_trait]
impl VideoSynthesizer for RemoteSynthesizer {
    #[instrument(skip(self, image, scene, params), fields(scene_id = %scene.id()))]
    async fn animate(
        &self,
        image: &ImageAsset,
        scene: &Scene,
        params: &GenerationParams,
    ) -> NarrataResult<VideoClip> {
        let url = self.endpoint(MediaKind::Video)?;
        let fps = params.fps().to_string();
        let request = self
            .client
            .post(url)
            .query(&[
                ("scene_id", scene.id().as_str()),
                ("prompt", params.prompt().as_str()),
                ("fps", fps.as_str()),
            ])
            .header(reqwest::header::CONTENT_TYPE, image.mime_type().as_str())
            .body(image.bytes().clone());
        let payload = self.send(MediaKind::Video, request).await?;
        Ok(VideoClip::new(
            payload.bytes,
            payload.mime_type,
            payload.duration_seconds,
        ))
    }

    fn provider_name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn characters_accept_joined_string() {
        let scene: RemoteScene =
            serde_json::from_str(r#"{"text":"x","characters":"Mara, Tom ,"}"#).unwrap();
        assert_eq!(scene.characters.into_vec(), vec!["Mara", "Tom"]);
    }

    #[test]
    fn action_level_is_clamped() {
        let scene: RemoteScene =
            serde_json::from_str(r#"{"text":"x","action_level":3.5}"#).unwrap();
        assert_eq!(*scene.into_scene(0).unwrap().action_level(), 1.0);
    }

    #[test]
    fn bare_array_is_accepted() {
        let parsed: SplitResponse = serde_json::from_str(r#"[{"text":"a"},{"text":"b"}]"#).unwrap();
        assert_eq!(parsed.into_scenes().len(), 2);
    }
}
