//! Timeline segments and the encoded artifact.

use crate::{AudioClip, Visual};
use serde::{Deserialize, Serialize};

/// Visual fades applied inside a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Fade from black at the segment start, in seconds.
    pub fade_in: f64,
    /// Fade to black at the segment end, in seconds.
    pub fade_out: f64,
}

/// One scene's worth of timeline: a visual held for the length of its audio.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSegment {
    /// Scene index.
    pub index: usize,
    /// What is shown.
    pub visual: Visual,
    /// What is heard.
    pub audio: AudioClip,
    /// Offset of this segment from the timeline start.
    pub start_seconds: f64,
    /// Segment length, taken from the audio.
    pub duration_seconds: f64,
    /// Visual fades, contained within the segment.
    pub transition: Transition,
    /// Audio fade length applied at both ends.
    pub audio_fade_seconds: f64,
}

impl TimelineSegment {
    /// Where this segment ends on the timeline.
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }
}

/// Ordered segments ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    /// Segments in scene order.
    pub segments: Vec<TimelineSegment>,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: u32,
}

impl Timeline {
    /// Total length; fades overlap within segments, so this is a plain sum.
    pub fn total_duration_seconds(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_seconds).sum()
    }

    /// Whether there is nothing to encode.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// The final encoded video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoArtifact {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Container MIME type.
    pub mime_type: String,
    /// Declared duration.
    pub duration_seconds: f64,
    /// Whether this is a degraded stand-in for a failed encode.
    pub placeholder: bool,
}

impl VideoArtifact {
    /// An encoded MP4.
    pub fn mp4(bytes: Vec<u8>, duration_seconds: f64) -> Self {
        Self {
            bytes,
            mime_type: "video/mp4".to_string(),
            duration_seconds,
            placeholder: false,
        }
    }

    /// Marks the artifact as a placeholder.
    pub fn into_placeholder(mut self) -> Self {
        self.placeholder = true;
        self
    }
}
