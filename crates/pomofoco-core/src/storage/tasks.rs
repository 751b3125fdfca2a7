use tracing::warn;

use super::{keys, load_json_or, save_json, KvStore};
use crate::error::StorageError;
use crate::task::Task;

/// The two task collections, `tasks` (active) and `completedTasks`,
/// each stored as a JSON array in insertion order.
///
/// Loading fails closed: records whose counts break the task invariants are
/// clamped back into range, and records with a blank name are dropped.
pub struct TaskStore<'a, S: KvStore + ?Sized> {
    kv: &'a S,
}

impl<'a, S: KvStore + ?Sized> TaskStore<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self { kv }
    }

    pub fn load_active(&self) -> Result<Vec<Task>, StorageError> {
        self.load(keys::TASKS)
    }

    pub fn save_active(&self, tasks: &[Task]) -> Result<(), StorageError> {
        save_json(self.kv, keys::TASKS, tasks)
    }

    pub fn load_completed(&self) -> Result<Vec<Task>, StorageError> {
        self.load(keys::COMPLETED_TASKS)
    }

    pub fn save_completed(&self, tasks: &[Task]) -> Result<(), StorageError> {
        save_json(self.kv, keys::COMPLETED_TASKS, tasks)
    }

    /// Write both collections in one batch, active first.
    ///
    /// On a store without atomic batches a failure part way leaves the moved
    /// task out of both collections rather than in both.
    pub fn save_both(&self, active: &[Task], completed: &[Task]) -> Result<(), StorageError> {
        let active = serde_json::to_string(active)?;
        let completed = serde_json::to_string(completed)?;
        self.kv.set_many(&[
            (keys::TASKS, active.as_str()),
            (keys::COMPLETED_TASKS, completed.as_str()),
        ])
    }

    fn load(&self, key: &str) -> Result<Vec<Task>, StorageError> {
        let tasks: Vec<Task> = load_json_or(self.kv, key, Vec::new)?;
        Ok(tasks
            .into_iter()
            .filter_map(|mut task| {
                if task.name.trim().is_empty() {
                    warn!(key, task_id = %task.id, "dropping stored task with a blank name");
                    return None;
                }
                let (estimated, completed) = (task.estimated_pomodoros, task.completed_pomodoros);
                if task.clamp_counts() {
                    warn!(
                        key,
                        task_id = %task.id,
                        estimated,
                        completed,
                        "stored task counts out of range, clamped"
                    );
                }
                Some(task)
            })
            .collect())
    }
}
