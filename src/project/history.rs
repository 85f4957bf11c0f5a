use std::collections::VecDeque;
use std::sync::Arc;

use crate::project::model::Project;

/// Default number of undo levels kept.
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 50;

/// One committed project state.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Monotonically increasing commit number (the initial state is 0).
    pub version: u64,
    /// Short label of the edit that produced this state.
    pub label: String,
    /// The project value. Shared, never mutated.
    pub project: Arc<Project>,
}

/// Linear undo/redo over immutable project snapshots.
///
/// Renderers can hold on to `Arc<Project>` from [`ProjectHistory::current`] while further
/// edits are committed; old snapshots are never modified.
#[derive(Debug)]
pub struct ProjectHistory {
    current: Snapshot,
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    next_version: u64,
    max_levels: usize,
}

impl ProjectHistory {
    /// Start a history at `initial` (version 0).
    pub fn new(initial: Project) -> Self {
        Self::with_max_levels(initial, DEFAULT_MAX_UNDO_LEVELS)
    }

    /// Start a history that keeps at most `max_levels` undo steps (at least one).
    pub fn with_max_levels(initial: Project, max_levels: usize) -> Self {
        Self {
            current: Snapshot {
                version: 0,
                label: "initial".to_owned(),
                project: Arc::new(initial),
            },
            undo: VecDeque::new(),
            redo: Vec::new(),
            next_version: 1,
            max_levels: max_levels.max(1),
        }
    }

    /// The current snapshot.
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// The current project.
    pub fn project(&self) -> Arc<Project> {
        Arc::clone(&self.current.project)
    }

    /// Make `project` current. Clears the redo stack; returns the new version.
    pub fn commit(&mut self, label: impl Into<String>, project: Project) -> u64 {
        let version = self.next_version;
        self.next_version += 1;
        let prev = std::mem::replace(
            &mut self.current,
            Snapshot {
                version,
                label: label.into(),
                project: Arc::new(project),
            },
        );
        self.undo.push_back(prev);
        while self.undo.len() > self.max_levels {
            self.undo.pop_front();
        }
        self.redo.clear();
        tracing::debug!(version, "project snapshot committed");
        version
    }

    /// Step back one commit. Returns the restored snapshot, or `None` at the oldest state.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        let prev = self.undo.pop_back()?;
        let cur = std::mem::replace(&mut self.current, prev);
        self.redo.push(cur);
        Some(&self.current)
    }

    /// Re-apply the last undone commit.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let next = self.redo.pop()?;
        let cur = std::mem::replace(&mut self.current, next);
        self.undo.push_back(cur);
        Some(&self.current)
    }

    /// Return `true` when [`ProjectHistory::undo`] would change state.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Return `true` when [`ProjectHistory::redo`] would change state.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/history.rs"]
mod tests;
