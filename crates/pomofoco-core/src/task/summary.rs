//! Remaining-work estimate over the active tasks.

use chrono::{DateTime, Duration, TimeZone};
use serde::Serialize;
use std::fmt::Display;

use super::Task;

/// Pomodoro totals and the projected finish time.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "DateTime<Tz>: Serialize"))]
pub struct TaskSummary<Tz: TimeZone> {
    pub total_estimated: u32,
    pub total_completed: u32,
    pub remaining: u32,
    /// Remaining focus time in hours.
    pub duration_hours: f64,
    pub finish_at: DateTime<Tz>,
}

impl<Tz: TimeZone> TaskSummary<Tz> {
    /// Summarize `tasks` assuming each remaining pomodoro takes `focus_secs`.
    pub fn from_tasks(tasks: &[Task], focus_secs: u32, now: DateTime<Tz>) -> Self {
        let total_estimated: u32 = tasks.iter().map(|t| t.estimated_pomodoros).sum();
        let total_completed: u32 = tasks.iter().map(|t| t.completed_pomodoros).sum();
        let remaining = total_estimated.saturating_sub(total_completed);
        let total_secs = i64::from(remaining) * i64::from(focus_secs);
        Self {
            total_estimated,
            total_completed,
            remaining,
            duration_hours: total_secs as f64 / 3600.0,
            finish_at: now + Duration::seconds(total_secs),
        }
    }

    /// Nothing left to show: no tasks, or every estimate met.
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

/// `HH:MM` in the timestamp's own offset.
pub fn format_clock<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%H:%M").to_string()
}

/// Minutes below one hour (`"45min"`), else hours with one decimal (`"1.5h"`).
pub fn format_hours(hours: f64) -> String {
    if hours < 1.0 {
        format!("{}min", (hours * 60.0).round() as u64)
    } else {
        format!("{hours:.1}h")
    }
}
