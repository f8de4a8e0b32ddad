//! The process-wide project store.

use narrata_core::{ProjectId, ProjectState, ProjectSummary};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Every project known to this process.
///
/// This is the only shared mutable structure in the pipeline. Closures
/// passed to [`update`](Self::update) and [`read`](Self::read) run under
/// the lock and must not await.
///
/// # Examples
///
/// ```
/// use narrata_core::{ProjectId, ProjectState};
/// use narrata_pipeline::ProjectStore;
///
/// let store = ProjectStore::new();
/// let id = ProjectId::from("p1");
/// store.insert(ProjectState::new(id.clone(), "Harbour"));
///
/// store.update(&id, |state| state.cancel_requested = true);
/// assert_eq!(store.read(&id, |state| state.cancel_requested), Some(true));
/// assert!(store.remove(&id).is_some());
/// assert!(store.get(&id).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    projects: Arc<RwLock<HashMap<ProjectId, ProjectState>>>,
}

impl ProjectStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a project, returning the previous state.
    pub fn insert(&self, state: ProjectState) -> Option<ProjectState> {
        self.projects.write().insert(state.id.clone(), state)
    }

    /// A copy of the project's state.
    pub fn get(&self, id: &ProjectId) -> Option<ProjectState> {
        self.projects.read().get(id).cloned()
    }

    /// Whether the project exists.
    pub fn contains(&self, id: &ProjectId) -> bool {
        self.projects.read().contains_key(id)
    }

    /// Removes the project.
    pub fn remove(&self, id: &ProjectId) -> Option<ProjectState> {
        self.projects.write().remove(id)
    }

    /// Mutates the project under the write lock.
    ///
    /// Returns `None` if the project does not exist.
    pub fn update<R>(&self, id: &ProjectId, f: impl FnOnce(&mut ProjectState) -> R) -> Option<R> {
        self.projects.write().get_mut(id).map(f)
    }

    /// Reads the project under the read lock.
    pub fn read<R>(&self, id: &ProjectId, f: impl FnOnce(&ProjectState) -> R) -> Option<R> {
        self.projects.read().get(id).map(f)
    }

    /// Sets the cancel flag; the running pipeline stops at its next checkpoint.
    ///
    /// Returns `false` if the project does not exist.
    pub fn request_cancel(&self, id: &ProjectId) -> bool {
        self.update(id, |state| state.cancel_requested = true).is_some()
    }

    /// Summaries of every project, oldest first.
    pub fn list(&self) -> Vec<ProjectSummary> {
        let mut summaries: Vec<ProjectSummary> =
            self.projects.read().values().map(ProjectState::summary).collect();
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    /// Number of projects whose status is neither `Created` nor terminal.
    pub fn running_count(&self) -> usize {
        self.projects
            .read()
            .values()
            .filter(|state| state.status.is_running())
            .count()
    }

    /// Number of projects.
    pub fn len(&self) -> usize {
        self.projects.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.projects.read().is_empty()
    }
}
