//! Task records and the engine that manages them.
//!
//! A task lives in exactly one of two collections: *active* (being worked on,
//! credited by focus intervals) or *completed*. The move between them is
//! one-way and handled by [`TaskEngine`].

mod engine;
pub mod summary;

pub use engine::TaskEngine;
pub use summary::TaskSummary;

use chrono::{DateTime, Duration, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper bound for a task estimate.
pub const MAX_ESTIMATED_POMODOROS: u32 = 99;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Trimmed, non-empty name
    pub name: String,
    /// Target number of focus intervals (1..=99)
    pub estimated_pomodoros: u32,
    /// Focus intervals credited so far, never above the estimate
    pub completed_pomodoros: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation, including the move to completed
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Task {
    pub fn is_complete(&self) -> bool {
        self.completed_pomodoros >= self.estimated_pomodoros
    }

    pub fn remaining_pomodoros(&self) -> u32 {
        self.estimated_pomodoros
            .saturating_sub(self.completed_pomodoros)
    }

    /// When the remaining pomodoros would be done if started at `now`.
    pub fn estimated_finish<Tz: TimeZone>(&self, focus_secs: u32, now: DateTime<Tz>) -> DateTime<Tz> {
        now + Duration::seconds(i64::from(self.remaining_pomodoros()) * i64::from(focus_secs))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.estimated_pomodoros, self.completed_pomodoros)
    }

    /// Bring the counts back to `1..=99` and `completed <= estimated`.
    /// Returns `true` if anything changed.
    pub(crate) fn clamp_counts(&mut self) -> bool {
        let estimated = self.estimated_pomodoros.clamp(1, MAX_ESTIMATED_POMODOROS);
        let completed = self.completed_pomodoros.min(estimated);
        let changed =
            estimated != self.estimated_pomodoros || completed != self.completed_pomodoros;
        self.estimated_pomodoros = estimated;
        self.completed_pomodoros = completed;
        changed
    }
}

/// Input for [`TaskEngine::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub estimated_pomodoros: u32,
    pub completed_pomodoros: u32,
    pub note: Option<String>,
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(name: impl Into<String>, estimated_pomodoros: u32) -> Self {
        Self {
            name: name.into(),
            estimated_pomodoros,
            completed_pomodoros: 0,
            note: None,
            tags: Vec::new(),
        }
    }

    pub fn with_completed(mut self, completed_pomodoros: u32) -> Self {
        self.completed_pomodoros = completed_pomodoros;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn into_task(self, id: String, now: DateTime<Utc>) -> Result<Task, ValidationError> {
        let task = Task {
            id,
            name: self.name.trim().to_string(),
            estimated_pomodoros: self.estimated_pomodoros,
            completed_pomodoros: self.completed_pomodoros,
            created_at: now,
            updated_at: now,
            note: normalize_note(self.note),
            tags: normalize_tags(self.tags),
        };
        task.validate()?;
        Ok(task)
    }
}

/// Partial update for [`TaskEngine::update`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub estimated_pomodoros: Option<u32>,
    pub completed_pomodoros: Option<u32>,
    /// `Some(None)` clears the note.
    pub note: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into a copy of `task`, validating the result.
    pub(crate) fn apply(self, task: &Task, now: DateTime<Utc>) -> Result<Task, ValidationError> {
        let mut updated = task.clone();
        if let Some(name) = self.name {
            updated.name = name.trim().to_string();
        }
        if let Some(estimated) = self.estimated_pomodoros {
            updated.estimated_pomodoros = estimated;
        }
        if let Some(completed) = self.completed_pomodoros {
            updated.completed_pomodoros = completed;
        }
        if let Some(note) = self.note {
            updated.note = normalize_note(note);
        }
        if let Some(tags) = self.tags {
            updated.tags = normalize_tags(tags);
        }
        updated.updated_at = now;
        updated.validate()?;
        Ok(updated)
    }
}

fn validate_fields(name: &str, estimated: u32, completed: u32) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    ValidationError::check_range("estimatedPomodoros", estimated, 1, MAX_ESTIMATED_POMODOROS)?;
    if completed > estimated {
        return Err(ValidationError::CompletedExceedsEstimate {
            completed,
            estimated,
        });
    }
    Ok(())
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Trim, drop empty entries and duplicates, keep first-seen order.
pub fn normalize_tags<I, T>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Current time at the millisecond precision tasks are stored with.
pub(crate) fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
