use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Snapshot;
use crate::timer::{Mode, ModeDurations};

/// Why the timer entered a new mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeChangeReason {
    /// The countdown reached zero.
    Expired,
    /// The user picked a mode.
    Manual,
    /// Full session reset.
    Reset,
    /// New durations were applied.
    Settings,
}

/// Every state change in the session produces an Event.
/// Front ends render them; the session routes some of them internally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// The countdown of `mode` reached zero.
    IntervalCompleted {
        mode: Mode,
        at: DateTime<Utc>,
    },
    /// A `foco` interval finished; the task binding credits the active task.
    WorkIntervalCompleted {
        work_interval_count: u32,
        active_task_id: Option<String>,
        at: DateTime<Utc>,
    },
    ModeChanged {
        from: Mode,
        to: Mode,
        reason: ModeChangeReason,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    TaskCredited {
        task_id: String,
        completed_pomodoros: u32,
        estimated_pomodoros: u32,
        at: DateTime<Utc>,
    },
    TaskCreated {
        task_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    /// Task moved to the completed collection.
    TaskCompleted {
        task_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    ActiveTaskChanged {
        from: Option<String>,
        to: Option<String>,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    SettingsUpdated {
        durations: ModeDurations,
        long_break_period: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot(Snapshot),
}
