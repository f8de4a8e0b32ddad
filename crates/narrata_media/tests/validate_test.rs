use narrata_core::{AudioClip, ImageAsset, VideoArtifact, Visual};
use narrata_media::{FallbackConfig, FallbackSynthesizer, OutputValidator, ValidatorConfig};
use std::io::Cursor;

fn png(width: u32, height: u32, shade: impl Fn(u32, u32) -> u8) -> Vec<u8> {
    let frame = image::GrayImage::from_fn(width, height, |x, y| image::Luma([shade(x, y)]));
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageLuma8(frame)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn detailed(width: u32, height: u32) -> Visual {
    Visual::Still(ImageAsset::new(
        png(width, height, |x, y| ((x + y) % 256) as u8),
        "image/png",
    ))
}

fn fallback() -> FallbackSynthesizer {
    FallbackSynthesizer::new(FallbackConfig::default()).unwrap()
}

fn narration(seconds: f64) -> AudioClip {
    let wav = fallback().silence_for(seconds).bytes().clone();
    AudioClip::new(wav, "audio/wav", None)
}

fn video() -> VideoArtifact {
    VideoArtifact::mp4(vec![0; 4096], 6.0)
}

#[test]
fn clean_output_is_valid() {
    let report = OutputValidator::default().validate(
        &[detailed(640, 640), detailed(512, 600)],
        &[narration(2.0), narration(3.0)],
        &video(),
    );

    assert!(report.is_valid, "{}", report.render());
    assert_eq!(report.quality_score, 1.0);
    assert!(report.issues.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(report.images_checked, 2);
    assert_eq!(report.audio_checked, 2);
    assert!(report.video_checked);
}

#[test]
fn blank_and_small_images_are_issues() {
    let blank = Visual::Still(ImageAsset::new(png(640, 640, |_, _| 200), "image/png"));
    let small = detailed(100, 80);

    let report = OutputValidator::default().check_media(&[blank, small], &[narration(1.0)]);

    assert!(!report.is_valid);
    assert_eq!(
        report.issues,
        vec![
            "Image 1 appears to be blank".to_string(),
            "Image 2 resolution too low: 100x80".to_string(),
        ]
    );
}

#[test]
fn thresholds_are_configurable() {
    let config = ValidatorConfig::default()
        .with_min_image_width(64u32)
        .with_min_image_height(64u32);

    let report = OutputValidator::new(config).check_media(&[detailed(100, 80)], &[narration(1.0)]);

    assert!(report.issues.is_empty());
}

#[test]
fn placeholders_are_warnings_not_issues() {
    let fallback = fallback();
    let report = OutputValidator::default().validate(
        &[Visual::Still(fallback.image())],
        &[fallback.silence("Short line.")],
        &video(),
    );

    assert!(report.issues.is_empty());
    assert_eq!(report.warnings.len(), 2);
    assert!(report.is_valid);
    assert!(report.render().contains("- Image 1 is a placeholder"));
}

#[test]
fn broken_narration_is_reported() {
    let report = OutputValidator::default().check_media(
        &[detailed(640, 640)],
        &[AudioClip::new(b"xx".to_vec(), "audio/wav", Some(2.0))],
    );

    assert_eq!(
        report.issues,
        vec![
            "Narration 1 is too short or empty".to_string(),
            "Narration 1 has an invalid format".to_string(),
        ]
    );
}

#[test]
fn placeholder_video_is_invalid() {
    let artifact = VideoArtifact::mp4(Vec::new(), 0.5).into_placeholder();

    let report = OutputValidator::default().validate(&[detailed(640, 640)], &[narration(1.0)], &artifact);

    assert!(!report.is_valid);
    assert_eq!(report.issues.len(), 3);
    assert_eq!(report.issues[0], "Video is a placeholder");
}

#[test]
fn score_never_drops_below_zero() {
    let undecodable: Vec<Visual> = (0..10)
        .map(|i| Visual::Still(ImageAsset::new(vec![i], "image/png")))
        .collect();

    let report = OutputValidator::default().check_media(&undecodable, &[]);

    assert_eq!(report.issues.len(), 11);
    assert_eq!(report.quality_score, 0.0);
    assert!(!report.is_valid);
}
