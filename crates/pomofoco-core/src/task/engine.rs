use tracing::{debug, info};
use uuid::Uuid;

use super::{timestamp_now, NewTask, Task, TaskPatch};
use crate::error::{CoreError, Result};
use crate::storage::{KvStore, TaskStore};

/// Task operations over a [`TaskStore`].
///
/// Stateless: every call reads the collections, mutates, and persists before
/// returning. Missing ids are reported as `false`/`None` except by
/// [`TaskEngine::update`].
pub struct TaskEngine<'a, S: KvStore + ?Sized> {
    store: TaskStore<'a, S>,
}

impl<'a, S: KvStore + ?Sized> TaskEngine<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self {
            store: TaskStore::new(kv),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn list_active(&self) -> Result<Vec<Task>> {
        Ok(self.store.load_active()?)
    }

    pub fn list_completed(&self) -> Result<Vec<Task>> {
        Ok(self.store.load_completed()?)
    }

    /// Completed tasks, most recently completed first.
    pub fn list_completed_recent(&self) -> Result<Vec<Task>> {
        let mut tasks = self.list_completed()?;
        tasks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(tasks)
    }

    pub fn get(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.list_active()?.into_iter().find(|t| t.id == id))
    }

    /// Id of the first active task that still has pomodoros left.
    pub fn first_incomplete(&self) -> Result<Option<String>> {
        Ok(self
            .list_active()?
            .into_iter()
            .find(|t| !t.is_complete())
            .map(|t| t.id))
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn create(&self, new_task: NewTask) -> Result<Task> {
        let task = new_task.into_task(Uuid::new_v4().to_string(), timestamp_now())?;
        let mut tasks = self.list_active()?;
        tasks.push(task.clone());
        self.store.save_active(&tasks)?;
        info!(task_id = %task.id, name = %task.name, "task created");
        Ok(task)
    }

    /// Merge `patch` into an active task.
    ///
    /// Never moves the task to the completed collection, even when the patch
    /// makes it complete.
    ///
    /// # Errors
    /// `NotFound` if `id` is not active; `Validation` if the merged task breaks
    /// the task invariants (nothing is persisted then).
    pub fn update(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        let mut tasks = self.list_active()?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;
        let updated = patch.apply(slot, timestamp_now())?;
        *slot = updated.clone();
        self.store.save_active(&tasks)?;
        debug!(task_id = %id, "task updated");
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut tasks = self.list_active()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        self.store.save_active(&tasks)?;
        info!(task_id = %id, "task deleted");
        Ok(true)
    }

    pub fn delete_completed(&self, id: &str) -> Result<bool> {
        let mut tasks = self.list_completed()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        self.store.save_completed(&tasks)?;
        info!(task_id = %id, "completed task deleted");
        Ok(true)
    }

    /// Mark an active task done and move it to the completed collection.
    ///
    /// Returns the moved task, or `None` if it is missing or already complete.
    pub fn toggle_complete(&self, id: &str) -> Result<Option<Task>> {
        let Some(task) = self.get(id)? else {
            return Ok(None);
        };
        if task.is_complete() {
            return Ok(None);
        }
        self.update(
            id,
            TaskPatch {
                completed_pomodoros: Some(task.estimated_pomodoros),
                ..TaskPatch::default()
            },
        )?;
        self.take_to_completed(id)
    }

    /// Credit one pomodoro, clamped at the estimate. A task that becomes
    /// complete is moved to the completed collection.
    pub fn increment_completed_count(&self, id: &str) -> Result<Option<Task>> {
        let Some(task) = self.get(id)? else {
            return Ok(None);
        };
        let completed = task
            .completed_pomodoros
            .saturating_add(1)
            .min(task.estimated_pomodoros);
        let updated = self.update(
            id,
            TaskPatch {
                completed_pomodoros: Some(completed),
                ..TaskPatch::default()
            },
        )?;
        if !updated.is_complete() {
            return Ok(Some(updated));
        }
        Ok(self.take_to_completed(id)?.or(Some(updated)))
    }

    /// Move an active task to the completed collection, refreshing `updatedAt`.
    pub fn move_to_completed(&self, id: &str) -> Result<bool> {
        Ok(self.take_to_completed(id)?.is_some())
    }

    /// Move every complete task still in the active collection.
    pub fn sweep_completed(&self) -> Result<Vec<Task>> {
        let ids: Vec<String> = self
            .list_active()?
            .into_iter()
            .filter(Task::is_complete)
            .map(|t| t.id)
            .collect();
        let mut moved = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(task) = self.take_to_completed(&id)? {
                moved.push(task);
            }
        }
        Ok(moved)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn take_to_completed(&self, id: &str) -> Result<Option<Task>> {
        let mut active = self.list_active()?;
        let Some(pos) = active.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let mut task = active.remove(pos);
        task.updated_at = timestamp_now();

        let mut completed = self.list_completed()?;
        completed.push(task.clone());
        self.store.save_both(&active, &completed)?;
        info!(task_id = %task.id, name = %task.name, "task moved to completed");
        Ok(Some(task))
    }
}
