use chrono::Utc;
use narrata_core::{
    FailureReason, MediaKind, ProgressView, ProjectId, ProjectState, ProjectStatus, Scene,
    SceneRecord, StepStatus,
};
use std::sync::Arc;

fn state_with_scenes(n: usize) -> ProjectState {
    let mut state = ProjectState::new(ProjectId::from("p"), "Progress");
    for i in 0..n {
        let scene = Arc::new(Scene::new(format!("s{}", i), i, "text"));
        state.scenes.push(SceneRecord::new(scene));
    }
    state.stats.total_scenes = n;
    state
}

#[test]
fn no_scenes_is_zero_percent() {
    let view = ProgressView::from_state(&state_with_scenes(0), Utc::now());
    assert_eq!(view.percent_complete, 0.0);
    assert!(!view.has_errors);
}

#[test]
fn percent_counts_both_stages() {
    let mut state = state_with_scenes(2);
    state.transition(ProjectStatus::AudioGenerating);
    state.scenes[0].image = StepStatus::Completed;
    state.scenes[1].image = StepStatus::Fallback;
    state.scenes[0].audio = StepStatus::Completed;
    state.scenes[0].video = StepStatus::Skipped;

    let view = ProgressView::from_state(&state, Utc::now());
    assert!((view.percent_complete - 75.0).abs() < 1e-9);
    assert_eq!(view.current_stage, "audio_generating");
}

#[test]
fn partial_degradation_is_visible_on_success() {
    let mut state = state_with_scenes(10);
    state.stats.failed.increment(MediaKind::Audio);
    state.stats.failed.increment(MediaKind::Audio);
    state.transition(ProjectStatus::Completed);

    let view = ProgressView::from_state(&state, Utc::now());
    assert!(view.is_complete);
    assert!(view.has_errors);
    assert_eq!(view.error_count, 2);
    assert_eq!(view.percent_complete, 100.0);
}

#[test]
fn failure_reason_is_exposed() {
    let mut state = state_with_scenes(1);
    state.fail(FailureReason::Cancelled);
    let view = ProgressView::from_state(&state, Utc::now());
    assert_eq!(view.status, ProjectStatus::Failed);
    assert_eq!(view.failure, Some(FailureReason::Cancelled));
    assert!(!view.is_complete);
}
