//! Read-only progress views and subscriptions.

use crate::ProjectStore;
use chrono::Utc;
use narrata_core::{ProgressView, ProjectId};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Projects store state into [`ProgressView`]s.
///
/// Subscriptions poll the store at a fixed interval and publish through a
/// `watch` channel, so a slow listener only ever sees the latest view.
#[derive(Debug, Clone)]
pub struct ProgressBroadcaster {
    store: ProjectStore,
    interval: Duration,
}

impl ProgressBroadcaster {
    /// Broadcaster refreshing every `interval`.
    pub fn new(store: ProjectStore, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Refresh period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The project's progress right now.
    pub fn snapshot(&self, id: &ProjectId) -> Option<ProgressView> {
        self.store
            .read(id, |state| ProgressView::from_state(state, Utc::now()))
    }

    /// A receiver refreshed every interval.
    ///
    /// The feeding task ends when the last receiver is dropped or the
    /// project is removed. Returns `None` for an unknown project.
    #[tracing::instrument(skip(self, id), fields(project_id = %id))]
    pub fn subscribe(&self, id: &ProjectId) -> Option<watch::Receiver<ProgressView>> {
        let initial = self.snapshot(id)?;
        let (tx, rx) = watch::channel(initial);
        let broadcaster = self.clone();
        let id = id.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(broadcaster.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = tx.closed() => break,
                }
                let Some(view) = broadcaster.snapshot(&id) else {
                    tracing::debug!(project_id = %id, "Project removed, ending progress feed");
                    break;
                };
                if tx.send(view).is_err() {
                    break;
                }
            }
            tracing::debug!(project_id = %id, "Progress feed ended");
        });

        Some(rx)
    }
}
