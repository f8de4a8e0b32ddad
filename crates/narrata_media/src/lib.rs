//! Media handling for narrata.
//!
//! Turns per-scene images and narration into one video:
//!
//! - [`FallbackSynthesizer`] produces deterministic stand-ins for failed synthesis
//! - [`TrackBalancer`] makes the image and audio tracks the same length
//! - [`TimelineComposer`] derives segment timing from audio and hands the
//!   timeline to a [`TimelineEncoder`](narrata_interface::TimelineEncoder)
//! - [`FfmpegEncoder`] is the encoder used in production
//! - [`OutputValidator`] scores what a run produced

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod balance;
mod compose;
mod config;
mod duration;
mod encoder;
mod fallback;
mod subtitles;
mod validate;

pub use balance::{BalancedTracks, TrackBalancer};
pub use compose::TimelineComposer;
pub use config::{
    ComposerConfig, ComposerConfigBuilder, FallbackConfig, FallbackConfigBuilder, ValidatorConfig,
    ValidatorConfigBuilder,
};
pub use duration::{decode_compressed_duration, decode_duration, decode_wav_duration, measure_duration};
pub use encoder::FfmpegEncoder;
pub use fallback::FallbackSynthesizer;
pub use subtitles::{SubtitleCue, to_srt};
pub use validate::OutputValidator;
