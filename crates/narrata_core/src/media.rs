//! Media payloads carried on tracks.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// The kinds of media synthesized per scene.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MediaKind {
    /// Still image
    Image,
    /// Narration audio
    Audio,
    /// Image-to-video clip
    Video,
}

/// A still image for one scene.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ImageAsset {
    bytes: Vec<u8>,
    mime_type: String,
    caption: Option<String>,
    placeholder: bool,
}

impl ImageAsset {
    /// A synthesized image.
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            caption: None,
            placeholder: false,
        }
    }

    /// A placeholder image carrying a caption to burn in.
    pub fn unavailable(bytes: Vec<u8>, mime_type: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            caption: Some(caption.into()),
            placeholder: true,
        }
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        }
    }
}

/// Narration audio for one scene.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct AudioClip {
    bytes: Vec<u8>,
    mime_type: String,
    duration_seconds: Option<f64>,
    placeholder: bool,
}

impl AudioClip {
    /// A synthesized clip whose duration may or may not be known.
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, duration_seconds: Option<f64>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            duration_seconds,
            placeholder: false,
        }
    }

    /// A placeholder clip of known length.
    pub fn silent(bytes: Vec<u8>, mime_type: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            duration_seconds: Some(duration_seconds),
            placeholder: true,
        }
    }

    /// Returns a copy with the declared duration replaced.
    pub fn with_duration(mut self, duration_seconds: f64) -> Self {
        self.duration_seconds = Some(duration_seconds);
        self
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/ogg" => "ogg",
            "audio/aac" => "aac",
            _ => "wav",
        }
    }
}

/// A short motion clip derived from a scene's image.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct VideoClip {
    bytes: Vec<u8>,
    mime_type: String,
    duration_seconds: Option<f64>,
}

impl VideoClip {
    /// A synthesized clip.
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, duration_seconds: Option<f64>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            duration_seconds,
        }
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "video/webm" => "webm",
            "video/quicktime" => "mov",
            _ => "mp4",
        }
    }
}

/// What is shown on screen for a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    /// A still image held for the segment's duration.
    Still(ImageAsset),
    /// A motion clip, with the still it was generated from.
    Motion {
        /// The generated clip.
        clip: VideoClip,
        /// The source image.
        poster: ImageAsset,
    },
}

impl Visual {
    /// The still image behind this visual.
    pub fn poster(&self) -> &ImageAsset {
        match self {
            Visual::Still(image) => image,
            Visual::Motion { poster, .. } => poster,
        }
    }

    /// Whether the visual is a fallback placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.poster().placeholder
    }
}

impl From<ImageAsset> for Visual {
    fn from(image: ImageAsset) -> Self {
        Visual::Still(image)
    }
}

/// Per-kind counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCounts {
    /// Images
    pub image: u32,
    /// Audio clips
    pub audio: u32,
    /// Video clips
    pub video: u32,
}

impl MediaCounts {
    /// Count for one kind.
    pub fn get(&self, kind: MediaKind) -> u32 {
        match kind {
            MediaKind::Image => self.image,
            MediaKind::Audio => self.audio,
            MediaKind::Video => self.video,
        }
    }

    /// Adds one to the given kind.
    pub fn increment(&mut self, kind: MediaKind) {
        match kind {
            MediaKind::Image => self.image += 1,
            MediaKind::Audio => self.audio += 1,
            MediaKind::Video => self.video += 1,
        }
    }

    /// Sum across kinds.
    pub fn total(&self) -> u32 {
        self.image + self.audio + self.video
    }
}
