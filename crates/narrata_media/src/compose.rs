//! Audio-driven timeline composition.

use crate::{BalancedTracks, ComposerConfig, SubtitleCue, measure_duration, to_srt};
use narrata_core::{Timeline, TimelineSegment, Transition, VideoArtifact, Visual};
use narrata_interface::TimelineEncoder;
use std::sync::Arc;

/// Builds a timeline from balanced tracks and encodes it.
///
/// Segment length always comes from the audio. Encoding failures never
/// reach the caller: they degrade to a short placeholder artifact.
#[derive(Clone)]
pub struct TimelineComposer {
    config: ComposerConfig,
    encoder: Arc<dyn TimelineEncoder>,
}

impl std::fmt::Debug for TimelineComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineComposer")
            .field("config", &self.config)
            .field("encoder", &self.encoder.name())
            .finish()
    }
}

impl TimelineComposer {
    /// Composer encoding with `encoder`.
    pub fn new(config: ComposerConfig, encoder: Arc<dyn TimelineEncoder>) -> Self {
        Self { config, encoder }
    }

    /// Active configuration.
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// A copy rendering at a different frame size and rate.
    pub fn with_frame(&self, width: u32, height: u32, fps: u32) -> Self {
        Self {
            config: self
                .config
                .clone()
                .with_width(width)
                .with_height(height)
                .with_fps(fps),
            encoder: self.encoder.clone(),
        }
    }

    /// Lays the tracks out on a timeline without encoding.
    ///
    /// Fades are clamped to half the segment so fade-in plus fade-out never
    /// exceeds the segment length.
    pub fn plan(&self, tracks: &BalancedTracks<Visual>) -> Timeline {
        let default_seconds = *self.config.default_segment_seconds();
        let mut start_seconds = 0.0;
        let mut segments = Vec::with_capacity(tracks.len());

        for (index, (visual, audio)) in tracks.visuals().iter().zip(tracks.audio()).enumerate() {
            let duration_seconds = measure_duration(audio, default_seconds);
            let half = duration_seconds / 2.0;
            let fade = self.config.fade_seconds().min(half).max(0.0);

            segments.push(TimelineSegment {
                index,
                visual: visual.clone(),
                audio: audio.clone(),
                start_seconds,
                duration_seconds,
                transition: Transition {
                    fade_in: fade,
                    fade_out: fade,
                },
                audio_fade_seconds: self.config.audio_fade_seconds().min(half).max(0.0),
            });
            start_seconds += duration_seconds;
        }

        Timeline {
            segments,
            width: *self.config.width(),
            height: *self.config.height(),
            fps: *self.config.fps(),
        }
    }

    /// Subtitle cues keyed to each segment's start, each lasting a fixed time.
    pub fn subtitle_cues(&self, timeline: &Timeline, captions: &[String]) -> Vec<SubtitleCue> {
        let hold = *self.config.subtitle_seconds();
        timeline
            .segments
            .iter()
            .zip(captions)
            .map(|(segment, text)| SubtitleCue {
                start_seconds: segment.start_seconds,
                end_seconds: segment.start_seconds + hold,
                text: text.clone(),
            })
            .collect()
    }

    /// Composes and encodes the tracks.
    ///
    /// `captions` holds each scene's text for the optional subtitle pass.
    #[tracing::instrument(skip_all, fields(segments = tracks.len(), encoder = self.encoder.name()))]
    pub async fn compose(
        &self,
        tracks: BalancedTracks<Visual>,
        captions: &[String],
    ) -> VideoArtifact {
        let timeline = self.plan(&tracks);
        if timeline.is_empty() {
            tracing::warn!("Nothing to compose, returning placeholder artifact");
            return self.placeholder().await;
        }

        let total = timeline.total_duration_seconds();
        let subtitles = if *self.config.subtitles() {
            Some(to_srt(&self.subtitle_cues(&timeline, captions)))
        } else {
            None
        };

        match self.encoder.encode(&timeline, subtitles.as_deref()).await {
            Ok(artifact) => return finished(artifact, total),
            Err(e) if subtitles.is_some() => {
                tracing::warn!(error = %e, "Encoding with subtitles failed, retrying without");
                match self.encoder.encode(&timeline, None).await {
                    Ok(artifact) => return finished(artifact, total),
                    Err(e) => tracing::warn!(error = %e, "Encoding failed"),
                }
            }
            Err(e) => tracing::warn!(error = %e, "Encoding failed"),
        }

        tracing::warn!(total_seconds = total, "Degrading to placeholder artifact");
        self.placeholder().await
    }

    /// A black, silent stand-in artifact.
    ///
    /// Falls back to an empty body when even the blank encode fails.
    pub async fn placeholder(&self) -> VideoArtifact {
        let seconds = *self.config.placeholder_seconds();
        match self
            .encoder
            .encode_blank(
                seconds,
                *self.config.width(),
                *self.config.height(),
                *self.config.fps(),
            )
            .await
        {
            Ok(artifact) => VideoArtifact {
                duration_seconds: seconds,
                ..artifact
            }
            .into_placeholder(),
            Err(e) => {
                tracing::warn!(error = %e, "Blank encode failed, returning empty placeholder");
                VideoArtifact::mp4(Vec::new(), seconds).into_placeholder()
            }
        }
    }
}

fn finished(artifact: VideoArtifact, total_seconds: f64) -> VideoArtifact {
    tracing::info!(
        bytes = artifact.bytes.len(),
        duration = total_seconds,
        "Composed video"
    );
    VideoArtifact {
        duration_seconds: total_seconds,
        ..artifact
    }
}
