//! In-memory task registry.
//!
//! `Mutex<HashMap>` keyed by task id. Single writer per key — the worker
//! that owns the task — and arbitrary readers taking cloned snapshots,
//! so the lock is only ever held for a map operation.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::task::BuildTask;

/// Result of a registry lookup. An unknown id is an answer, not an
/// error: pollers race task creation and must get a typed sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskLookup {
    Found { task: BuildTask },
    NotFound { task_id: String },
}

impl TaskLookup {
    pub fn found(&self) -> Option<&BuildTask> {
        match self {
            TaskLookup::Found { task } => Some(task),
            TaskLookup::NotFound { .. } => None,
        }
    }
}

/// Shared store of background validation tasks.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Mutex<HashMap<String, BuildTask>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new task under its own id.
    pub fn insert(&self, task: BuildTask) {
        let mut tasks = self.tasks.lock().expect("task registry lock poisoned");
        tasks.insert(task.id.clone(), task);
    }

    /// Mutate a task in place under the lock. Unknown ids are ignored;
    /// only the owning worker calls this, after insertion.
    pub fn update<F: FnOnce(&mut BuildTask)>(&self, task_id: &str, mutate: F) {
        let mut tasks = self.tasks.lock().expect("task registry lock poisoned");
        if let Some(task) = tasks.get_mut(task_id) {
            mutate(task);
        }
    }

    /// Snapshot lookup by id.
    pub fn lookup(&self, task_id: &str) -> TaskLookup {
        let tasks = self.tasks.lock().expect("task registry lock poisoned");
        match tasks.get(task_id) {
            Some(task) => TaskLookup::Found { task: task.clone() },
            None => TaskLookup::NotFound {
                task_id: task_id.to_string(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().expect("task registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
