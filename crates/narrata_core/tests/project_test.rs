use narrata_core::{
    FailureReason, GenerationOutcome, MediaKind, ProjectId, ProjectState, ProjectStatus, Scene,
    SceneRecord, StepStatus,
};
use std::sync::Arc;

#[test]
fn created_is_startable_but_not_running() {
    assert!(!ProjectStatus::Created.is_running());
    assert!(!ProjectStatus::Created.is_terminal());
    assert!(ProjectStatus::ImagesGenerating.is_running());
    assert!(ProjectStatus::Failed.is_terminal());
}

#[test]
fn reset_for_run_clears_previous_run() {
    let mut state = ProjectState::new(ProjectId::from("p1"), "Story").with_text("Once.");
    state.scenes.push(SceneRecord::new(Arc::new(Scene::new("s1", 0, "Once."))));
    state.stats.failed.increment(MediaKind::Audio);
    state.cancel_requested = true;
    state.fail(FailureReason::Cancelled);

    state.reset_for_run();

    assert_eq!(state.status, ProjectStatus::Created);
    assert!(state.scenes.is_empty());
    assert_eq!(state.stats.error_count(), 0);
    assert!(!state.cancel_requested);
    assert!(state.failure.is_none());
    assert_eq!(state.source_text.as_deref(), Some("Once."));
}

#[test]
fn cancelled_reason_is_distinguishable() {
    let cancelled = FailureReason::Cancelled;
    let organic = FailureReason::Stage {
        stage: ProjectStatus::TextAnalyzing,
        message: "segmenter unreachable".into(),
    };
    assert!(cancelled.is_cancelled());
    assert!(!organic.is_cancelled());
    assert_eq!(cancelled.to_string(), "cancelled");
    assert_eq!(organic.to_string(), "text_analyzing: segmenter unreachable");
}

#[test]
fn skipped_video_counts_as_done() {
    let mut record = SceneRecord::new(Arc::new(Scene::new("s1", 0, "text")));
    record.audio = StepStatus::Fallback;
    assert!(!record.narration_done());
    *record.step_mut(MediaKind::Video) = StepStatus::Skipped;
    assert!(record.narration_done());
}

#[test]
fn outcome_substitutes_on_failure() {
    let outcome: GenerationOutcome<&str> = GenerationOutcome::failure("timeout");
    let resolved = outcome.unwrap_or_else(|reason| if reason == "timeout" { "fallback" } else { "?" });
    assert_eq!(resolved, "fallback");
}

#[test]
fn scene_builder_requires_text() {
    let result = Scene::builder().id("s1").order(0usize).build();
    assert!(result.is_err());
}

#[test]
fn scene_builder_rejects_blank_id() {
    let err = Scene::builder()
        .id("  ")
        .order(0usize)
        .text("A door creaks.")
        .build()
        .unwrap_err();
    assert_eq!(err.kind, narrata_error::BuilderErrorKind::BlankField("scene id"));
}
