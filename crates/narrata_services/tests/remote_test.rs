mod test_utils;

use narrata_core::{GenerationParams, ProjectSettings, Scene};
use narrata_error::{NarrataErrorKind, SynthesisErrorKind};
use narrata_interface::{AudioSynthesizer, ImageSynthesizer, SceneSegmenter, VideoSynthesizer};
use narrata_services::{RemoteSegmenter, RemoteSynthesizer, ServicesConfig};
use test_utils::spawn_services;

fn scene() -> (Scene, GenerationParams) {
    let scene = Scene::new("scene_1", 0, "The lighthouse went dark.");
    let params = GenerationParams::for_scene(&scene, &ProjectSettings::default());
    (scene, params)
}

fn synthesis_kind(err: &narrata_error::NarrataError) -> SynthesisErrorKind {
    match err.kind() {
        NarrataErrorKind::Synthesis(e) => e.kind.clone(),
        other => panic!("expected synthesis error, got {}", other),
    }
}

#[tokio::test]
async fn remote_segmenter_orders_scenes() {
    let base = spawn_services().await;
    let segmenter = RemoteSegmenter::new(&base, 5).unwrap();

    let scenes = segmenter.segment("First part | Second part").await.unwrap();

    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[1].text(), "Second part");
    assert_eq!(*scenes[1].order(), 1);
    assert_eq!(scenes[0].id(), "scene_1");
    assert_eq!(scenes[0].mood().as_deref(), Some("calm"));
}

#[tokio::test]
async fn remote_segmenter_reads_fenced_json() {
    let base = spawn_services().await;
    let segmenter = RemoteSegmenter::new(format!("{}/fenced/", base), 5).unwrap();

    let scenes = segmenter.segment("anything").await.unwrap();

    assert_eq!(scenes.len(), 1);
    assert_eq!(scenes[0].text(), "fenced scene");
    assert_eq!(scenes[0].characters(), &vec!["Tom".to_string(), "Ann".to_string()]);
}

#[tokio::test]
async fn remote_segmenter_passes_empty_result_through() {
    let base = spawn_services().await;
    let segmenter = RemoteSegmenter::new(format!("{}/empty", base), 5).unwrap();
    assert!(segmenter.segment("anything").await.unwrap().is_empty());
}

#[tokio::test]
async fn remote_segmenter_reports_status() {
    let base = spawn_services().await;
    let segmenter = RemoteSegmenter::new(format!("{}/broken", base), 5).unwrap();

    let err = segmenter.segment("anything").await.unwrap_err();

    match err.kind() {
        NarrataErrorKind::Http(e) => assert_eq!(e.status, Some(500)),
        other => panic!("expected HTTP error, got {}", other),
    }
}

#[tokio::test]
async fn synthesizer_returns_media_with_content_type() {
    let base = spawn_services().await;
    let config = ServicesConfig::default()
        .with_image_url(format!("{}/image", base))
        .with_audio_url(format!("{}/audio", base))
        .with_video_url(format!("{}/video", base));
    let synthesizer = RemoteSynthesizer::new(&config).unwrap();
    let (scene, params) = scene();

    let image = synthesizer.synthesize_image(&scene, &params).await.unwrap();
    assert_eq!(image.mime_type(), "image/png");
    assert!(!*image.placeholder());

    let audio = synthesizer.synthesize_audio(&scene, &params).await.unwrap();
    assert_eq!(audio.mime_type(), "audio/mpeg");
    assert_eq!(*audio.duration_seconds(), Some(2.5));
    assert_eq!(audio.bytes(), scene.text().as_bytes());

    let clip = synthesizer.animate(&image, &scene, &params).await.unwrap();
    assert_eq!(clip.bytes(), image.bytes());
    assert_eq!(clip.mime_type(), "video/mp4");
}

#[tokio::test]
async fn missing_endpoint_is_unavailable() {
    let synthesizer = RemoteSynthesizer::new(&ServicesConfig::default()).unwrap();
    let (scene, params) = scene();

    let err = synthesizer.synthesize_image(&scene, &params).await.unwrap_err();

    assert!(matches!(synthesis_kind(&err), SynthesisErrorKind::Unavailable(_)));
    assert!(!synthesizer.supports_video());
}

#[tokio::test]
async fn error_status_is_remote_failure() {
    let base = spawn_services().await;
    let config = ServicesConfig::default().with_image_url(format!("{}/broken", base));
    let synthesizer = RemoteSynthesizer::new(&config).unwrap();
    let (scene, params) = scene();

    let err = synthesizer.synthesize_image(&scene, &params).await.unwrap_err();

    match synthesis_kind(&err) {
        SynthesisErrorKind::Remote(message) => assert!(message.contains("boom")),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn non_media_body_is_invalid() {
    let base = spawn_services().await;
    let (scene, params) = scene();

    for route in ["json", "empty"] {
        let config = ServicesConfig::default().with_image_url(format!("{}/{}", base, route));
        let synthesizer = RemoteSynthesizer::new(&config).unwrap();
        let err = synthesizer.synthesize_image(&scene, &params).await.unwrap_err();
        assert!(
            matches!(synthesis_kind(&err), SynthesisErrorKind::InvalidResponse(_)),
            "route {}",
            route
        );
    }
}

#[tokio::test]
async fn unreachable_service_is_remote_failure() {
    let config = ServicesConfig::default().with_image_url("http://127.0.0.1:9/image");
    let synthesizer = RemoteSynthesizer::new(&config).unwrap();
    let (scene, params) = scene();

    let err = synthesizer.synthesize_image(&scene, &params).await.unwrap_err();

    assert!(matches!(
        synthesis_kind(&err),
        SynthesisErrorKind::Remote(_) | SynthesisErrorKind::Timeout(_)
    ));
}
