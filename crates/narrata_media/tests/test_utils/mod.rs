//! Shared helpers for media tests.

#![allow(dead_code)]

use async_trait::async_trait;
use narrata_core::{Timeline, VideoArtifact};
use narrata_error::{MediaError, MediaErrorKind, NarrataResult};
use narrata_interface::TimelineEncoder;
use narrata_media::{FallbackConfig, FallbackSynthesizer};
use std::sync::{Arc, Mutex};

/// How the mock encoder responds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Encode everything.
    Success,
    /// Fail timelines but encode blanks.
    FailTimeline,
    /// Fail only when subtitles are requested.
    FailWithSubtitles,
    /// Fail everything.
    FailAll,
}

/// Records what it was asked to encode.
#[derive(Debug)]
pub struct MockEncoder {
    behavior: MockBehavior,
    pub timelines: Mutex<Vec<(Timeline, Option<String>)>>,
    pub blanks: Mutex<Vec<f64>>,
    pub blank_fps: Mutex<Vec<u32>>,
}

impl MockEncoder {
    pub fn new(behavior: MockBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            timelines: Mutex::new(Vec::new()),
            blanks: Mutex::new(Vec::new()),
            blank_fps: Mutex::new(Vec::new()),
        })
    }

    pub fn encode_calls(&self) -> usize {
        self.timelines.lock().unwrap().len()
    }
}

#[async_trait]
impl TimelineEncoder for MockEncoder {
    async fn encode(&self, timeline: &Timeline, subtitles: Option<&str>) -> NarrataResult<VideoArtifact> {
        self.timelines
            .lock()
            .unwrap()
            .push((timeline.clone(), subtitles.map(str::to_string)));
        let fail = match self.behavior {
            MockBehavior::Success => false,
            MockBehavior::FailWithSubtitles => subtitles.is_some(),
            MockBehavior::FailTimeline | MockBehavior::FailAll => true,
        };
        if fail {
            return Err(MediaError::new(MediaErrorKind::Encode("mock failure".into())).into());
        }
        Ok(VideoArtifact::mp4(b"encoded".to_vec(), timeline.total_duration_seconds()))
    }

    async fn encode_blank(
        &self,
        duration_seconds: f64,
        _width: u32,
        _height: u32,
        fps: u32,
    ) -> NarrataResult<VideoArtifact> {
        self.blanks.lock().unwrap().push(duration_seconds);
        self.blank_fps.lock().unwrap().push(fps);
        if self.behavior == MockBehavior::FailAll {
            return Err(MediaError::new(MediaErrorKind::EncoderUnavailable("mock".into())).into());
        }
        Ok(VideoArtifact::mp4(b"blank".to_vec(), duration_seconds))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn fallback() -> Arc<FallbackSynthesizer> {
    Arc::new(FallbackSynthesizer::new(FallbackConfig::default()).unwrap())
}
