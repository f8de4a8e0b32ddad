//! Per-project generation settings and per-call parameters.

use crate::Scene;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

const PROMPT_CHARS: usize = 200;

/// How a project's media should be generated.
///
/// # Examples
///
/// ```
/// use narrata_core::ProjectSettings;
///
/// let settings = ProjectSettings::default().with_image_style("watercolor");
/// assert_eq!(settings.image_style(), "watercolor");
/// assert_eq!(*settings.fps(), 24);
/// assert!(settings.video_from_image().is_none());
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
#[setters(prefix = "with_", into)]
#[builder(default, setter(into))]
pub struct ProjectSettings {
    /// Visual style appended to image prompts.
    #[serde(default = "default_image_style")]
    image_style: String,
    /// Frame width in pixels.
    #[serde(default = "default_width")]
    width: u32,
    /// Frame height in pixels.
    #[serde(default = "default_height")]
    height: u32,
    /// Output frame rate.
    #[serde(default = "default_fps")]
    fps: u32,
    /// Overrides the service-wide image-to-video switch for this project.
    #[serde(default)]
    #[setters(strip_option)]
    video_from_image: Option<bool>,
    /// Narration language.
    #[serde(default = "default_language")]
    language: String,
    /// Narration voice, if the synthesizer supports several.
    #[serde(default)]
    #[setters(strip_option)]
    voice: Option<String>,
}

fn default_image_style() -> String {
    "cinematic".to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_fps() -> u32 {
    24
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            image_style: default_image_style(),
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            video_from_image: None,
            language: default_language(),
            voice: None,
        }
    }
}

impl ProjectSettings {
    /// Creates a new settings builder.
    pub fn builder() -> ProjectSettingsBuilder {
        ProjectSettingsBuilder::default()
    }

    /// Resolves the image-to-video switch against the service default.
    pub fn wants_video(&self, service_default: bool) -> bool {
        self.video_from_image.unwrap_or(service_default)
    }
}

/// Parameters handed to a synthesizer for one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct GenerationParams {
    prompt: String,
    narration: String,
    style: String,
    width: u32,
    height: u32,
    fps: u32,
    speech_rate: f32,
    language: String,
    voice: Option<String>,
}

impl GenerationParams {
    /// Derives prompt and narration parameters from a scene.
    ///
    /// Calmer scenes are read slightly slower: the speech rate runs from
    /// 0.9 at action level 0 to 1.2 at action level 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use narrata_core::{GenerationParams, ProjectSettings, Scene};
    ///
    /// let scene = Scene::builder()
    ///     .id("s1")
    ///     .order(0usize)
    ///     .text("A quiet street at dawn.")
    ///     .setting("old town")
    ///     .action_level(0.5f32)
    ///     .build()
    ///     .unwrap();
    /// let params = GenerationParams::for_scene(&scene, &ProjectSettings::default());
    ///
    /// assert!(params.prompt().starts_with("old town. A quiet street"));
    /// assert!(params.prompt().ends_with("cinematic cinematic style"));
    /// assert!((params.speech_rate() - 1.05).abs() < 1e-6);
    /// ```
    pub fn for_scene(scene: &Scene, settings: &ProjectSettings) -> Self {
        let base = match scene.setting() {
            Some(setting) if !setting.is_empty() => format!("{}. {}", setting, scene.text()),
            _ => scene.text().clone(),
        };
        let truncated: String = base.chars().take(PROMPT_CHARS).collect();
        let prompt = format!(
            "{}, cinematic {} style",
            truncated.trim_end(),
            settings.image_style()
        );

        Self {
            prompt,
            narration: scene.text().clone(),
            style: settings.image_style().clone(),
            width: *settings.width(),
            height: *settings.height(),
            fps: *settings.fps(),
            speech_rate: 0.9 + scene.action_level() * 0.3,
            language: settings.language().clone(),
            voice: settings.voice().clone(),
        }
    }
}
