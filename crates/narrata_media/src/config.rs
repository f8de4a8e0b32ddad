//! Composer and fallback settings.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Timing and output settings for timeline composition.
///
/// # Examples
///
/// ```
/// use narrata_media::ComposerConfig;
///
/// let config = ComposerConfig::default().with_subtitles(true);
/// assert_eq!(*config.fade_seconds(), 0.5);
/// assert!(*config.subtitles());
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
#[setters(prefix = "with_")]
#[builder(default)]
pub struct ComposerConfig {
    /// Segment length when an audio clip's duration cannot be determined.
    #[serde(default = "default_segment_seconds")]
    default_segment_seconds: f64,
    /// Visual fade at each segment boundary.
    #[serde(default = "default_fade_seconds")]
    fade_seconds: f64,
    /// Audio fade at each segment boundary.
    #[serde(default = "default_audio_fade_seconds")]
    audio_fade_seconds: f64,
    /// Length of the stand-in artifact returned when encoding fails.
    #[serde(default = "default_placeholder_seconds")]
    placeholder_seconds: f64,
    /// Output width.
    #[serde(default = "default_width")]
    width: u32,
    /// Output height.
    #[serde(default = "default_height")]
    height: u32,
    /// Output frame rate.
    #[serde(default = "default_fps")]
    fps: u32,
    /// ffmpeg binary name or path.
    #[serde(default = "default_ffmpeg_path")]
    #[setters(into)]
    ffmpeg_path: String,
    /// Burn scene text in as subtitles.
    #[serde(default)]
    subtitles: bool,
    /// How long each subtitle stays on screen.
    #[serde(default = "default_subtitle_seconds")]
    subtitle_seconds: f64,
}

fn default_segment_seconds() -> f64 {
    3.0
}

fn default_fade_seconds() -> f64 {
    0.5
}

fn default_audio_fade_seconds() -> f64 {
    0.1
}

fn default_placeholder_seconds() -> f64 {
    1.0
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

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_subtitle_seconds() -> f64 {
    3.0
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            default_segment_seconds: default_segment_seconds(),
            fade_seconds: default_fade_seconds(),
            audio_fade_seconds: default_audio_fade_seconds(),
            placeholder_seconds: default_placeholder_seconds(),
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            ffmpeg_path: default_ffmpeg_path(),
            subtitles: false,
            subtitle_seconds: default_subtitle_seconds(),
        }
    }
}

impl ComposerConfig {
    /// Creates a new builder.
    pub fn builder() -> ComposerConfigBuilder {
        ComposerConfigBuilder::default()
    }
}

/// How placeholder media is rendered.
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
#[setters(prefix = "with_")]
#[builder(default)]
pub struct FallbackConfig {
    /// Shortest silence substituted for failed narration.
    #[serde(default = "default_min_silence_seconds")]
    min_silence_seconds: f64,
    /// Longest silence ever rendered, whatever the narration length.
    #[serde(default = "default_max_silence_seconds")]
    max_silence_seconds: f64,
    /// Silence per character of narration text.
    #[serde(default = "default_seconds_per_char")]
    seconds_per_char: f64,
    /// Silence length used to fill an empty audio track.
    #[serde(default = "default_segment_seconds")]
    default_silence_seconds: f64,
    /// Sample rate of generated silence.
    #[serde(default = "default_sample_rate")]
    sample_rate: u32,
    /// Caption carried by placeholder images.
    #[serde(default = "default_caption")]
    #[setters(into)]
    caption: String,
    /// Placeholder image width.
    #[serde(default = "default_width")]
    width: u32,
    /// Placeholder image height.
    #[serde(default = "default_height")]
    height: u32,
}

fn default_min_silence_seconds() -> f64 {
    1.0
}

fn default_max_silence_seconds() -> f64 {
    60.0
}

fn default_seconds_per_char() -> f64 {
    0.1
}

fn default_sample_rate() -> u32 {
    22_050
}

fn default_caption() -> String {
    "unavailable".to_string()
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            min_silence_seconds: default_min_silence_seconds(),
            max_silence_seconds: default_max_silence_seconds(),
            seconds_per_char: default_seconds_per_char(),
            default_silence_seconds: default_segment_seconds(),
            sample_rate: default_sample_rate(),
            caption: default_caption(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl FallbackConfig {
    /// Creates a new builder.
    pub fn builder() -> FallbackConfigBuilder {
        FallbackConfigBuilder::default()
    }
}

/// Thresholds for checking a run's output.
///
/// # Examples
///
/// ```
/// use narrata_media::ValidatorConfig;
///
/// let config = ValidatorConfig::default();
/// assert_eq!(*config.min_quality_score(), 0.6);
/// assert_eq!(*config.min_image_width(), 512);
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
#[setters(prefix = "with_")]
#[builder(default)]
pub struct ValidatorConfig {
    /// Narrower images are reported as issues.
    #[serde(default = "default_min_image_side")]
    min_image_width: u32,
    /// Shorter images are reported as issues.
    #[serde(default = "default_min_image_side")]
    min_image_height: u32,
    /// Grayscale variance below which an image counts as blank.
    #[serde(default = "default_blank_variance")]
    blank_variance: f64,
    /// Smaller narration payloads are reported as issues.
    #[serde(default = "default_min_payload_bytes")]
    min_audio_bytes: usize,
    /// Smaller video files are reported as issues.
    #[serde(default = "default_min_payload_bytes")]
    min_video_bytes: usize,
    /// Shorter videos are reported as issues.
    #[serde(default = "default_min_video_seconds")]
    min_video_seconds: f64,
    /// Score an output needs, with no issues, to be valid.
    #[serde(default = "default_min_quality_score")]
    min_quality_score: f64,
}

fn default_min_image_side() -> u32 {
    512
}

fn default_blank_variance() -> f64 {
    100.0
}

fn default_min_payload_bytes() -> usize {
    1000
}

fn default_min_video_seconds() -> f64 {
    1.0
}

fn default_min_quality_score() -> f64 {
    0.6
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_image_width: default_min_image_side(),
            min_image_height: default_min_image_side(),
            blank_variance: default_blank_variance(),
            min_audio_bytes: default_min_payload_bytes(),
            min_video_bytes: default_min_payload_bytes(),
            min_video_seconds: default_min_video_seconds(),
            min_quality_score: default_min_quality_score(),
        }
    }
}
