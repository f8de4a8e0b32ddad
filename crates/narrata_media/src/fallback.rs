//! Deterministic placeholder media.

use crate::FallbackConfig;
use narrata_core::{AudioClip, ImageAsset, Visual};
use narrata_error::{MediaError, MediaErrorKind, NarrataResult};
use std::io::Cursor;

const PLACEHOLDER_RGB: [u8; 3] = [18, 24, 38];

/// Produces stand-in media when a synthesis call fails.
///
/// The same input always yields byte-identical output, so a timeline with
/// placeholders renders the same way on every run.
///
/// # Examples
///
/// ```
/// use narrata_media::{FallbackConfig, FallbackSynthesizer};
///
/// let fallback = FallbackSynthesizer::new(FallbackConfig::default()).unwrap();
///
/// // Short narration still gets at least a second of silence.
/// let clip = fallback.silence("Hi.");
/// assert_eq!(*clip.duration_seconds(), Some(1.0));
///
/// let image = fallback.image();
/// assert_eq!(image.caption().as_deref(), Some("unavailable"));
/// assert!(*image.placeholder());
/// ```
#[derive(Debug, Clone)]
pub struct FallbackSynthesizer {
    config: FallbackConfig,
    image_png: Vec<u8>,
}

impl FallbackSynthesizer {
    /// Renders the placeholder frame once up front.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be PNG-encoded.
    pub fn new(config: FallbackConfig) -> NarrataResult<Self> {
        let image_png = render_frame(*config.width(), *config.height())?;
        tracing::debug!(
            width = config.width(),
            height = config.height(),
            bytes = image_png.len(),
            "Rendered placeholder frame"
        );
        Ok(Self { config, image_png })
    }

    /// Active configuration.
    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    /// Placeholder still carrying the configured caption.
    pub fn image(&self) -> ImageAsset {
        ImageAsset::unavailable(self.image_png.clone(), "image/png", self.config.caption().clone())
    }

    /// Placeholder for a failed image-to-video call: the scene's own still.
    pub fn video(&self, poster: ImageAsset) -> Visual {
        Visual::Still(poster)
    }

    /// Seconds of silence substituted for narration of `text`.
    pub fn silence_seconds(&self, text: &str) -> f64 {
        let chars = text.chars().count() as f64;
        (self.config.seconds_per_char() * chars)
            .max(*self.config.min_silence_seconds())
            .min(*self.config.max_silence_seconds())
    }

    /// Silence long enough to stand in for narrating `text`.
    pub fn silence(&self, text: &str) -> AudioClip {
        self.silence_for(self.silence_seconds(text))
    }

    /// Silence used to fill an empty audio track.
    pub fn default_silence(&self) -> AudioClip {
        self.silence_for(*self.config.default_silence_seconds())
    }

    /// Silence of `seconds`, capped at `max_silence_seconds`.
    pub fn silence_for(&self, seconds: f64) -> AudioClip {
        let seconds = seconds.max(0.0).min(*self.config.max_silence_seconds());
        match render_silence(seconds, *self.config.sample_rate()) {
            Ok(bytes) => AudioClip::silent(bytes, "audio/wav", seconds),
            Err(e) => {
                tracing::warn!(error = %e, seconds, "Could not render silence, using declared duration only");
                AudioClip::silent(Vec::new(), "audio/wav", seconds)
            }
        }
    }
}

fn render_frame(width: u32, height: u32) -> NarrataResult<Vec<u8>> {
    let frame = image::RgbImage::from_pixel(width.max(1), height.max(1), image::Rgb(PLACEHOLDER_RGB));
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(frame)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|e| MediaError::new(MediaErrorKind::Placeholder(e.to_string())))?;
    Ok(buffer.into_inner())
}

fn render_silence(seconds: f64, sample_rate: u32) -> NarrataResult<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let frames = (seconds * sample_rate as f64).round() as u64;
    let to_error = |e: hound::Error| MediaError::new(MediaErrorKind::Placeholder(e.to_string()));

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec).map_err(to_error)?;
        for _ in 0..frames {
            writer.write_sample(0i16).map_err(to_error)?;
        }
        writer.finalize().map_err(to_error)?;
    }
    Ok(buffer.into_inner())
}
