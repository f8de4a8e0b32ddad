//! Wiring from configuration and one-shot rendering.
//!
//! No collaborator endpoints and no ffmpeg are configured, so every scene
//! falls back to placeholders and the artifact degrades to an empty file.

use narrata::{
    ComposerConfig, ErrorPolicy, NarrataConfig, ProjectStatus, ProjectStore, StorageConfig,
    batch_files, build_runner, render_file,
};
use tempfile::TempDir;

fn offline_config(dir: &TempDir) -> NarrataConfig {
    NarrataConfig::default()
        .with_storage(StorageConfig::default().with_path(dir.path().join("store")))
        .with_composer(ComposerConfig::default().with_ffmpeg_path("narrata-test-no-ffmpeg"))
}

const STORY: &str = "Ivo lit the lamp.\n\nThe storm reached the lighthouse.\n\nIvo waited for morning.";

#[tokio::test]
async fn test_build_runner_uses_local_segmenter_without_url() {
    let dir = TempDir::new().unwrap();
    let config = offline_config(&dir);

    let segmenter = narrata::segmenter(&config).unwrap();
    let runner = build_runner(&config, ProjectStore::new()).unwrap();

    assert_eq!(segmenter.name(), "paragraph");
    assert_eq!(*runner.config().worker_pool_size(), 3);
    assert!(dir.path().join("store").exists());
}

#[tokio::test]
async fn test_render_file_completes_with_placeholders() {
    let dir = TempDir::new().unwrap();
    let config = offline_config(&dir);
    let runner = build_runner(&config, ProjectStore::new()).unwrap();
    let input = dir.path().join("lighthouse.txt");
    std::fs::write(&input, STORY).unwrap();
    let output = dir.path().join("lighthouse.mp4");

    let outcome = render_file(&runner, &input, None, &output).await.unwrap();

    assert!(outcome.is_completed());
    assert!(output.exists());
    let projects = runner.store().list();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].title, "lighthouse");
    assert_eq!(projects[0].status, ProjectStatus::Completed);
    assert_eq!(projects[0].scene_count, 3);
    assert!(runner.metrics().snapshot().fallback_substitutions >= 6);
}

#[tokio::test]
async fn test_render_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let runner = build_runner(&offline_config(&dir), ProjectStore::new()).unwrap();

    let result = render_file(
        &runner,
        &dir.path().join("absent.txt"),
        None,
        &dir.path().join("absent.mp4"),
    )
    .await;

    assert!(result.is_err());
    assert!(runner.store().is_empty());
}

#[tokio::test]
async fn test_batch_files_reports_every_member() {
    let dir = TempDir::new().unwrap();
    let runner = build_runner(&offline_config(&dir), ProjectStore::new()).unwrap();
    let mut files = Vec::new();
    for name in ["one", "two", "three"] {
        let path = dir.path().join(format!("{}.txt", name));
        std::fs::write(&path, STORY).unwrap();
        files.push(path);
    }

    let report = batch_files(&runner, &files, 2, ErrorPolicy::SkipAndContinue)
        .await
        .unwrap();

    assert_eq!(report.success_count(), 3);
    assert_eq!(report.failure_count(), 0);
    assert_eq!(runner.store().len(), 3);
}
