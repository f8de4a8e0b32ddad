//! Batch concurrency limits and error policies.

mod test_utils;

use narrata_core::{BatchRun, ErrorPolicy, FailureReason, ProjectId, ProjectStatus};
use narrata_error::PipelineErrorKind;
use narrata_pipeline::{BatchController, PipelineConfig};
use std::time::Duration;
use test_utils::{Harness, MockBehavior, MockSegmenter, MockSynthesizer, story};

fn ok() -> MockSynthesizer {
    MockSynthesizer::new(MockBehavior::Success)
}

fn slow(millis: u64) -> MockSynthesizer {
    ok().with_delay(Duration::from_millis(millis))
}

#[tokio::test]
async fn test_skip_and_continue_reports_every_member() {
    let h = Harness::new(ok(), ok());
    let ids: Vec<ProjectId> = (1..=5)
        .map(|i| {
            let text = if i == 3 { "FAIL".to_string() } else { story(2) };
            h.project(&format!("p{}", i), &text)
        })
        .collect();
    let batches = BatchController::new(h.runner.clone());

    let report = batches
        .run_batch(ids.clone(), 2, ErrorPolicy::SkipAndContinue)
        .await
        .unwrap();

    assert_eq!(report.success_count(), 4);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failed[0].project_id, ids[2]);
    assert!(report.skipped.is_empty());
    assert_eq!(
        report.succeeded,
        vec![ids[0].clone(), ids[1].clone(), ids[3].clone(), ids[4].clone()]
    );
}

#[tokio::test]
async fn test_concurrency_limit_is_respected() {
    let h = Harness::new(slow(30), ok());
    let ids: Vec<ProjectId> = (1..=6)
        .map(|i| h.project(&format!("p{}", i), &story(1)))
        .collect();
    let batches = BatchController::new(h.runner.clone());

    let report = batches
        .run_batch(ids, 2, ErrorPolicy::SkipAndContinue)
        .await
        .unwrap();

    assert_eq!(report.success_count(), 6);
    assert_eq!(h.images.calls(), 6);
    assert!(h.images.max_in_flight() <= 2, "saw {}", h.images.max_in_flight());
    assert!(h.images.max_in_flight() >= 1);
}

#[tokio::test]
async fn test_zero_limit_is_rejected() {
    let h = Harness::new(ok(), ok());
    let id = h.project("p1", &story(1));
    let batches = BatchController::new(h.runner.clone());

    let err = batches
        .run_batch(vec![id.clone()], 0, ErrorPolicy::SkipAndContinue)
        .await
        .unwrap_err();

    assert!(matches!(
        err.pipeline_kind(),
        Some(PipelineErrorKind::InvalidConcurrency(0))
    ));
    assert_eq!(h.store.get(&id).unwrap().status, ProjectStatus::Created);
    assert!(batches
        .submit(BatchRun::new(vec![id], 0, ErrorPolicy::FailFast))
        .is_err());
}

#[tokio::test]
async fn test_fail_fast_skips_queued_members() {
    let h = Harness::new(ok(), ok());
    let first = h.project("p1", "FAIL");
    let second = h.project("p2", &story(1));
    let third = h.project("p3", &story(1));
    let batches = BatchController::new(h.runner.clone());

    let err = batches
        .run_batch(vec![first, second.clone(), third.clone()], 1, ErrorPolicy::FailFast)
        .await
        .unwrap_err();

    match err.pipeline_kind() {
        Some(PipelineErrorKind::BatchMemberFailed { project_id, .. }) => {
            assert_eq!(project_id, "p1");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(h.images.calls(), 0);
    assert_eq!(h.store.get(&second).unwrap().status, ProjectStatus::Created);
    assert_eq!(h.store.get(&third).unwrap().status, ProjectStatus::Created);
    assert!(batches.active().is_empty());
}

#[tokio::test]
async fn test_fail_fast_cancels_running_members() {
    let h = Harness::new(slow(40), ok());
    let long = h.project("long", &story(6));
    let broken = h.project("broken", "FAIL");
    let batches = BatchController::new(h.runner.clone());

    let err = batches
        .run_batch(vec![long.clone(), broken], 2, ErrorPolicy::FailFast)
        .await
        .unwrap_err();

    assert!(matches!(
        err.pipeline_kind(),
        Some(PipelineErrorKind::BatchMemberFailed { .. })
    ));
    let state = h.store.get(&long).unwrap();
    assert_eq!(state.status, ProjectStatus::Failed);
    assert_eq!(state.failure, Some(FailureReason::Cancelled));
    assert!(h.images.calls() < 6);
}

#[tokio::test]
async fn test_missing_member_counts_as_failure() {
    let h = Harness::new(ok(), ok());
    let real = h.project("real", &story(1));
    let ghost = ProjectId::from("ghost");
    let batches = BatchController::new(h.runner.clone());

    let report = batches
        .run_batch(
            vec![real.clone(), ghost.clone()],
            2,
            ErrorPolicy::SkipAndContinue,
        )
        .await
        .unwrap();

    assert_eq!(report.succeeded, vec![real]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].project_id, ghost);
    assert!(report.failed[0].reason.contains("not found"));
}

#[tokio::test]
async fn test_submitted_batch_is_visible_until_done() {
    let h = Harness::new(slow(30), ok());
    let ids: Vec<ProjectId> = (1..=3)
        .map(|i| h.project(&format!("p{}", i), &story(2)))
        .collect();
    let batches = BatchController::new(h.runner.clone());
    let batch = BatchRun::new(ids, 1, ErrorPolicy::SkipAndContinue);
    let batch_id = batch.id.clone();

    let task = batches.submit(batch).unwrap();
    let visible = batches.get(&batch_id).unwrap();
    assert_eq!(visible.concurrency_limit, 1);
    assert_eq!(batches.active().len(), 1);

    let report = task.await.unwrap().unwrap();
    assert_eq!(report.batch_id, batch_id);
    assert_eq!(report.success_count(), 3);
    assert!(batches.get(&batch_id).is_none());

    let view = batches.view(&batch_id).unwrap();
    assert!(view.finished);
    assert_eq!(view.report, Some(report));
}

#[tokio::test]
async fn test_limit_above_member_count_is_clamped() {
    let h = Harness::new(ok(), ok());
    let id = h.project("p1", &story(1));
    let batches = BatchController::new(h.runner.clone());

    let report = batches
        .run_batch(vec![id.clone()], usize::MAX, ErrorPolicy::SkipAndContinue)
        .await
        .unwrap();

    assert_eq!(report.succeeded, vec![id]);
}

#[tokio::test]
async fn test_empty_batch_with_huge_limit_reports_nothing() {
    let h = Harness::new(ok(), ok());
    let batches = BatchController::new(h.runner.clone());

    let report = batches
        .run_batch(Vec::new(), usize::MAX, ErrorPolicy::FailFast)
        .await
        .unwrap();

    assert_eq!(report.success_count(), 0);
    assert_eq!(report.failure_count(), 0);
}

#[tokio::test]
async fn test_fail_fast_report_is_kept_with_cause() {
    let h = Harness::new(ok(), ok());
    let first = h.project("p1", "FAIL");
    let second = h.project("p2", &story(1));
    let batches = BatchController::new(h.runner.clone());
    let batch = BatchRun::new(vec![first.clone(), second.clone()], 1, ErrorPolicy::FailFast);
    let batch_id = batch.id.clone();

    assert!(batches.run(batch).await.is_err());

    let report = batches.view(&batch_id).unwrap().report.unwrap();
    assert_eq!(report.failed[0].project_id, first);
    assert_eq!(report.skipped, vec![second]);
    assert_eq!(report.stopped_by.unwrap().project_id, first);
}

#[tokio::test]
async fn test_history_drops_oldest_reports() {
    let h = Harness::build(
        ok(),
        ok(),
        PipelineConfig::default().with_batch_history(2usize),
        MockSegmenter::default(),
    );
    let batches = BatchController::new(h.runner.clone());
    let mut ids = Vec::new();
    for _ in 0..3 {
        let batch = BatchRun::new(Vec::new(), 1, ErrorPolicy::SkipAndContinue);
        ids.push(batch.id.clone());
        batches.run(batch).await.unwrap();
    }

    assert!(batches.view(&ids[0]).is_none());
    assert!(batches.view(&ids[1]).is_some());
    assert!(batches.view(&ids[2]).is_some());
}
