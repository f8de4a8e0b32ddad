//! Batch submission and reporting.

use crate::ProjectId;
use serde::{Deserialize, Serialize};

/// What a batch does when one member fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop admitting members and cancel running ones.
    FailFast,
    /// Record the failure and carry on.
    #[default]
    SkipAndContinue,
}

/// A batch in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRun {
    /// Batch identifier.
    pub id: String,
    /// Projects in submission order.
    pub member_project_ids: Vec<ProjectId>,
    /// Maximum concurrent pipelines.
    pub concurrency_limit: usize,
    /// Failure handling.
    pub error_policy: ErrorPolicy,
}

impl BatchRun {
    /// A batch with a fresh id.
    pub fn new(
        member_project_ids: Vec<ProjectId>,
        concurrency_limit: usize,
        error_policy: ErrorPolicy,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            member_project_ids,
            concurrency_limit,
            error_policy,
        }
    }
}

/// One failed member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// The member.
    pub project_id: ProjectId,
    /// Why it failed.
    pub reason: String,
}

/// Outcome of every member of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Batch identifier.
    pub batch_id: String,
    /// Members that completed.
    pub succeeded: Vec<ProjectId>,
    /// Members that failed or were rejected.
    pub failed: Vec<BatchFailure>,
    /// Members never started because a fail-fast batch stopped.
    pub skipped: Vec<ProjectId>,
    /// The failure that stopped a fail-fast batch.
    #[serde(default)]
    pub stopped_by: Option<BatchFailure>,
}

impl BatchReport {
    /// Completed members.
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    /// Failed members.
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}

/// A batch as reported to clients, running or finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchView {
    /// The submission.
    #[serde(flatten)]
    pub batch: BatchRun,
    /// Whether every member has settled.
    pub finished: bool,
    /// Member outcomes, once finished.
    pub report: Option<BatchReport>,
}

impl BatchView {
    /// A batch still running.
    pub fn running(batch: BatchRun) -> Self {
        Self {
            batch,
            finished: false,
            report: None,
        }
    }

    /// A batch whose members have all settled.
    pub fn finished(batch: BatchRun, report: BatchReport) -> Self {
        Self {
            batch,
            finished: true,
            report: Some(report),
        }
    }
}
