//! Running many projects under one concurrency limit.

use crate::{PipelineRunner, RunOutcome};
use narrata_core::{BatchFailure, BatchReport, BatchRun, BatchView, ErrorPolicy, ProjectId};
use narrata_error::{NarrataResult, PipelineError, PipelineErrorKind};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

enum MemberResult {
    Succeeded,
    Failed(String),
    Skipped,
}

/// Removes a batch from the active set when it finishes, however it finishes.
struct ActiveGuard {
    active: Arc<RwLock<HashMap<String, BatchRun>>>,
    id: String,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.write().remove(&self.id);
    }
}

/// Admits at most `concurrency_limit` pipelines of a batch at once.
///
/// Members queue on a counting semaphore in submission order. With
/// [`ErrorPolicy::SkipAndContinue`] failures are only recorded. With
/// [`ErrorPolicy::FailFast`] the first failure stops admission, cancels
/// running members and waits for them before reporting.
///
/// Finished reports are kept for lookup up to the runner's configured
/// `batch_history`.
#[derive(Debug, Clone)]
pub struct BatchController {
    runner: PipelineRunner,
    active: Arc<RwLock<HashMap<String, BatchRun>>>,
    finished: Arc<RwLock<VecDeque<BatchView>>>,
    history: usize,
}

impl BatchController {
    /// Controller starting pipelines through `runner`.
    pub fn new(runner: PipelineRunner) -> Self {
        let history = *runner.config().batch_history();
        Self {
            runner,
            active: Arc::new(RwLock::new(HashMap::new())),
            finished: Arc::new(RwLock::new(VecDeque::with_capacity(history))),
            history,
        }
    }

    /// A batch still running.
    pub fn get(&self, batch_id: &str) -> Option<BatchRun> {
        self.active.read().get(batch_id).cloned()
    }

    /// A finished batch still held in history, or a running one.
    pub fn view(&self, batch_id: &str) -> Option<BatchView> {
        let finished = self
            .finished
            .read()
            .iter()
            .find(|view| view.batch.id == batch_id)
            .cloned();
        finished.or_else(|| self.get(batch_id).map(BatchView::running))
    }

    /// Every batch still running.
    pub fn active(&self) -> Vec<BatchRun> {
        self.active.read().values().cloned().collect()
    }

    /// Runs the projects and reports each member's outcome.
    ///
    /// # Errors
    ///
    /// `InvalidConcurrency` for a limit of zero; `BatchMemberFailed` when a
    /// fail-fast batch stops.
    pub async fn run_batch(
        &self,
        project_ids: Vec<ProjectId>,
        concurrency_limit: usize,
        error_policy: ErrorPolicy,
    ) -> NarrataResult<BatchReport> {
        self.run(BatchRun::new(project_ids, concurrency_limit, error_policy))
            .await
    }

    /// Registers the batch and runs it in the background.
    ///
    /// The batch is visible through [`get`](Self::get) as soon as this returns.
    ///
    /// # Errors
    ///
    /// `InvalidConcurrency` for a limit of zero.
    pub fn submit(
        &self,
        batch: BatchRun,
    ) -> NarrataResult<tokio::task::JoinHandle<NarrataResult<BatchReport>>> {
        validate(&batch)?;
        let guard = self.register(&batch);
        let controller = self.clone();
        Ok(tokio::spawn(async move {
            let result = controller.execute(batch).await;
            drop(guard);
            result
        }))
    }

    /// Runs a prepared batch to completion.
    ///
    /// # Errors
    ///
    /// Same as [`run_batch`](Self::run_batch).
    pub async fn run(&self, batch: BatchRun) -> NarrataResult<BatchReport> {
        validate(&batch)?;
        let _guard = self.register(&batch);
        self.execute(batch).await
    }

    fn register(&self, batch: &BatchRun) -> ActiveGuard {
        self.active.write().insert(batch.id.clone(), batch.clone());
        ActiveGuard {
            active: self.active.clone(),
            id: batch.id.clone(),
        }
    }

    fn remember(&self, batch: BatchRun, report: BatchReport) {
        if self.history == 0 {
            return;
        }
        let mut finished = self.finished.write();
        while finished.len() >= self.history {
            finished.pop_front();
        }
        finished.push_back(BatchView::finished(batch, report));
    }

    #[instrument(skip(self, batch), fields(batch_id = %batch.id, members = batch.member_project_ids.len(), limit = batch.concurrency_limit, policy = %batch.error_policy))]
    async fn execute(&self, batch: BatchRun) -> NarrataResult<BatchReport> {
        // More permits than members never admits anyone extra.
        let limit = batch
            .concurrency_limit
            .min(batch.member_project_ids.len().max(1));
        let permits = Arc::new(Semaphore::new(limit));
        let stopped = Arc::new(AtomicBool::new(false));
        let started: Arc<Mutex<HashSet<ProjectId>>> = Arc::new(Mutex::new(HashSet::new()));
        let mut members = JoinSet::new();

        let fail_fast = batch.error_policy == ErrorPolicy::FailFast;
        for (index, id) in batch.member_project_ids.iter().cloned().enumerate() {
            let runner = self.runner.clone();
            let permits = permits.clone();
            let stopped = stopped.clone();
            let started = started.clone();
            members.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return (index, id, MemberResult::Skipped);
                };
                if stopped.load(Ordering::SeqCst) {
                    return (index, id, MemberResult::Skipped);
                }
                let result = match runner.start(&id) {
                    Ok(handle) => {
                        started.lock().insert(id.clone());
                        if stopped.load(Ordering::SeqCst) {
                            handle.cancel();
                        }
                        match handle.wait().await {
                            RunOutcome::Completed(_) => MemberResult::Succeeded,
                            RunOutcome::Failed(reason) => MemberResult::Failed(reason.to_string()),
                        }
                    }
                    Err(e) => {
                        warn!(project_id = %id, error = %e, "Batch member rejected");
                        MemberResult::Failed(e.to_string())
                    }
                };
                // Raised while the permit is still held so no queued member slips in.
                if fail_fast && matches!(result, MemberResult::Failed(_)) {
                    stopped.store(true, Ordering::SeqCst);
                }
                (index, id, result)
            });
        }

        let mut results: HashMap<usize, MemberResult> = HashMap::new();
        let mut first_failure: Option<(ProjectId, String)> = None;
        while let Some(joined) = members.join_next().await {
            let (index, id, result) = match joined {
                Ok(member) => member,
                Err(e) => {
                    error!(error = %e, "Batch member task aborted");
                    continue;
                }
            };

            if let MemberResult::Failed(reason) = &result {
                debug!(project_id = %id, reason = %reason, "Batch member failed");
                if fail_fast && first_failure.is_none() {
                    warn!(project_id = %id, "Stopping fail-fast batch");
                    first_failure = Some((id.clone(), reason.clone()));
                    stopped.store(true, Ordering::SeqCst);
                    for member in started.lock().iter() {
                        self.runner.store().update(member, |state| {
                            if state.status.is_running() {
                                state.cancel_requested = true;
                            }
                        });
                    }
                }
            }
            results.insert(index, result);
        }

        let mut report = BatchReport {
            batch_id: batch.id.clone(),
            ..BatchReport::default()
        };
        for (index, id) in batch.member_project_ids.iter().enumerate() {
            match results.remove(&index) {
                Some(MemberResult::Succeeded) => report.succeeded.push(id.clone()),
                Some(MemberResult::Failed(reason)) => report.failed.push(BatchFailure {
                    project_id: id.clone(),
                    reason,
                }),
                Some(MemberResult::Skipped) => report.skipped.push(id.clone()),
                None => report.failed.push(BatchFailure {
                    project_id: id.clone(),
                    reason: "member task aborted".to_string(),
                }),
            }
        }

        info!(
            succeeded = report.success_count(),
            failed = report.failure_count(),
            skipped = report.skipped.len(),
            "Batch finished"
        );

        report.stopped_by = first_failure.clone().map(|(project_id, reason)| BatchFailure {
            project_id,
            reason,
        });
        self.remember(batch, report.clone());

        match first_failure {
            Some((project_id, reason)) => Err(PipelineError::new(
                PipelineErrorKind::BatchMemberFailed {
                    project_id: project_id.to_string(),
                    reason,
                },
            )
            .into()),
            None => Ok(report),
        }
    }
}

fn validate(batch: &BatchRun) -> NarrataResult<()> {
    if batch.concurrency_limit == 0 {
        return Err(PipelineError::new(PipelineErrorKind::InvalidConcurrency(0)).into());
    }
    Ok(())
}
