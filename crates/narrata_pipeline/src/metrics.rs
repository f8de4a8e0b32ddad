//! Runtime counters for pipelines and fallbacks.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every pipeline in the process.
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    inner: Arc<PipelineMetricsInner>,
}

#[derive(Debug, Default)]
struct PipelineMetricsInner {
    started: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
    fallbacks: AtomicU64,
}

/// A point-in-time copy of [`PipelineMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Pipelines started.
    pub pipelines_started: u64,
    /// Pipelines that reached `Completed`.
    pub pipelines_completed: u64,
    /// Pipelines that failed organically.
    pub pipelines_failed: u64,
    /// Pipelines stopped by cancellation.
    pub pipelines_cancelled: u64,
    /// Pipelines started but not yet finished.
    pub pipelines_active: u64,
    /// Placeholder substitutions.
    pub fallback_substitutions: u64,
}

impl PipelineMetrics {
    /// Zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pipeline start.
    pub fn record_started(&self) {
        self.inner.started.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a completed pipeline.
    pub fn record_completed(&self) {
        self.inner.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an organic failure.
    pub fn record_failed(&self) {
        self.inner.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a cancellation.
    pub fn record_cancelled(&self) {
        self.inner.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a placeholder substitution.
    pub fn record_fallback(&self) {
        self.inner.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Placeholder substitutions so far.
    pub fn fallbacks(&self) -> u64 {
        self.inner.fallbacks.load(Ordering::Relaxed)
    }

    /// Current values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let started = self.inner.started.load(Ordering::Relaxed);
        let completed = self.inner.completed.load(Ordering::Relaxed);
        let failed = self.inner.failed.load(Ordering::Relaxed);
        let cancelled = self.inner.cancelled.load(Ordering::Relaxed);
        MetricsSnapshot {
            pipelines_started: started,
            pipelines_completed: completed,
            pipelines_failed: failed,
            pipelines_cancelled: cancelled,
            pipelines_active: started.saturating_sub(completed + failed + cancelled),
            fallback_substitutions: self.inner.fallbacks.load(Ordering::Relaxed),
        }
    }
}
