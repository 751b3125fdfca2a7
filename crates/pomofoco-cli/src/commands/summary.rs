use chrono::Local;
use pomofoco_core::task::summary::{format_clock, format_hours};
use pomofoco_core::{Config, TaskSummary};
use serde_json::json;

use super::{open_session, print_json, CliResult};

/// Totals over the active tasks and when they would be done if every
/// remaining pomodoro started now.
pub fn run(config: &Config) -> CliResult {
    let session = open_session(config)?;
    let tasks = session.tasks().list_active()?;
    let focus_secs = session.durations().foco;
    let now = Local::now();
    let summary = TaskSummary::from_tasks(&tasks, focus_secs, now);

    let per_task: Vec<_> = tasks
        .iter()
        .map(|task| {
            json!({
                "id": task.id,
                "name": task.name,
                "remaining": task.remaining_pomodoros(),
                "finishAt": format_clock(&task.estimated_finish(focus_secs, now)),
            })
        })
        .collect();

    print_json(&json!({
        "totalEstimated": summary.total_estimated,
        "totalCompleted": summary.total_completed,
        "remaining": summary.remaining,
        "duration": format_hours(summary.duration_hours),
        "finishAt": format_clock(&summary.finish_at),
        "activeTaskId": session.active_task_id(),
        "tasks": per_task,
    }))
}
