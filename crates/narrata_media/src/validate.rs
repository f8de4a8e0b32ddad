//! Quality checks over generated media.

use crate::{ValidatorConfig, decode_duration};
use narrata_core::{AudioClip, ImageAsset, ValidationReport, VideoArtifact, Visual};

const ISSUE_PENALTY: f64 = 0.2;
const WARNING_PENALTY: f64 = 0.1;
const IMAGE_BONUS: f64 = 0.3;
const AUDIO_BONUS: f64 = 0.3;
const VIDEO_BONUS: f64 = 0.4;

/// Inspects a run's images, narration and final video.
///
/// Placeholders are reported as warnings and anything else that looks
/// broken as an issue. Findings never fail a project.
///
/// # Examples
///
/// ```
/// use narrata_core::VideoArtifact;
/// use narrata_media::OutputValidator;
///
/// let validator = OutputValidator::default();
/// let report = validator.check_media(&[], &[]);
/// assert!(report.issues.contains(&"No images generated".to_string()));
///
/// let report = validator.check_video(report, &VideoArtifact::mp4(Vec::new(), 0.5));
/// assert!(!report.is_valid);
/// assert!(report.video_checked);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OutputValidator {
    config: ValidatorConfig,
}

impl OutputValidator {
    /// Validator with the given thresholds.
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Active thresholds.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Checks every scene's visual and narration.
    pub fn check_media(&self, visuals: &[Visual], audio: &[AudioClip]) -> ValidationReport {
        let mut report = ValidationReport::default();

        if visuals.is_empty() {
            report.issues.push("No images generated".to_string());
        }
        for (i, visual) in visuals.iter().enumerate() {
            self.check_image(&mut report, i + 1, visual.poster());
        }
        report.images_checked = visuals.len();

        if audio.is_empty() {
            report.issues.push("No audio generated".to_string());
        }
        for (i, clip) in audio.iter().enumerate() {
            self.check_audio(&mut report, i + 1, clip);
        }
        report.audio_checked = audio.len();

        self.score(report)
    }

    /// Adds the final video's findings to `report`.
    pub fn check_video(&self, mut report: ValidationReport, artifact: &VideoArtifact) -> ValidationReport {
        if artifact.placeholder {
            report.issues.push("Video is a placeholder".to_string());
        }
        if artifact.bytes.len() < *self.config.min_video_bytes() {
            report.issues.push(format!(
                "Video file too small ({} bytes), likely corrupted",
                artifact.bytes.len()
            ));
        }
        if artifact.duration_seconds < *self.config.min_video_seconds() {
            report.issues.push(format!(
                "Video duration too short: {:.2}s",
                artifact.duration_seconds
            ));
        }
        if !artifact.mime_type.starts_with("video/") {
            report
                .issues
                .push(format!("Invalid video format: {}", artifact.mime_type));
        }
        report.video_checked = true;
        self.score(report)
    }

    /// Both checks at once.
    pub fn validate(
        &self,
        visuals: &[Visual],
        audio: &[AudioClip],
        artifact: &VideoArtifact,
    ) -> ValidationReport {
        self.check_video(self.check_media(visuals, audio), artifact)
    }

    fn check_image(&self, report: &mut ValidationReport, n: usize, image: &ImageAsset) {
        if *image.placeholder() {
            report.warnings.push(format!("Image {} is a placeholder", n));
            return;
        }
        let decoded = match image::load_from_memory(image.bytes()) {
            Ok(decoded) => decoded,
            Err(e) => {
                report
                    .issues
                    .push(format!("Image {} could not be decoded: {}", n, e));
                return;
            }
        };

        let (width, height) = (decoded.width(), decoded.height());
        if width < *self.config.min_image_width() || height < *self.config.min_image_height() {
            report
                .issues
                .push(format!("Image {} resolution too low: {}x{}", n, width, height));
        }
        if luma_variance(&decoded) < *self.config.blank_variance() {
            report.issues.push(format!("Image {} appears to be blank", n));
        }
    }

    fn check_audio(&self, report: &mut ValidationReport, n: usize, clip: &AudioClip) {
        if *clip.placeholder() {
            report.warnings.push(format!("Narration {} is silence", n));
            return;
        }
        if clip.bytes().len() < *self.config.min_audio_bytes() {
            report
                .issues
                .push(format!("Narration {} is too short or empty", n));
        }
        if decode_duration(clip).is_err() {
            report
                .issues
                .push(format!("Narration {} has an invalid format", n));
        }
    }

    fn score(&self, mut report: ValidationReport) -> ValidationReport {
        let mut score = 1.0
            - ISSUE_PENALTY * report.issues.len() as f64
            - WARNING_PENALTY * report.warnings.len() as f64;
        if report.images_checked > 0 {
            score += IMAGE_BONUS;
        }
        if report.audio_checked > 0 {
            score += AUDIO_BONUS;
        }
        if report.video_checked {
            score += VIDEO_BONUS;
        }
        report.quality_score = score.clamp(0.0, 1.0);
        report.is_valid =
            report.issues.is_empty() && report.quality_score >= *self.config.min_quality_score();
        report
    }
}

fn luma_variance(image: &image::DynamicImage) -> f64 {
    let luma = image.to_luma8();
    let count = luma.width() as usize * luma.height() as usize;
    if count == 0 {
        return 0.0;
    }
    let n = count as f64;
    let mean = luma.pixels().map(|p| f64::from(p.0[0])).sum::<f64>() / n;
    luma.pixels()
        .map(|p| {
            let d = f64::from(p.0[0]) - mean;
            d * d
        })
        .sum::<f64>()
        / n
}
