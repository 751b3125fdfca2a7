//! Task management commands for CLI.

use clap::Subcommand;
use pomofoco_core::task::normalize_tags;
use pomofoco_core::{Config, CoreError, NewTask, TaskPatch};
use serde_json::json;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task name
        name: String,
        /// Estimated pomodoros (1-99)
        #[arg(long, default_value = "1")]
        estimated: u32,
        /// Pomodoros already done
        #[arg(long, default_value = "0")]
        completed: u32,
        /// Free-text note
        #[arg(long)]
        note: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List active tasks
    List,
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update an active task
    Update {
        /// Task ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New estimated pomodoros
        #[arg(long)]
        estimated: Option<u32>,
        /// New completed pomodoros
        #[arg(long)]
        completed: Option<u32>,
        /// New note
        #[arg(long, conflicts_with = "clear_note")]
        note: Option<String>,
        /// Remove the note
        #[arg(long)]
        clear_note: bool,
        /// Comma-separated tags (empty string clears them)
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete an active task
    Delete {
        /// Task ID
        id: String,
    },
    /// Mark a task done and move it to the completed list
    Complete {
        /// Task ID
        id: String,
    },
    /// Credit one pomodoro to a task
    Credit {
        /// Task ID
        id: String,
    },
}

fn split_tags(tags: &str) -> Vec<String> {
    normalize_tags(tags.split(','))
}

fn not_found(id: String) -> Box<dyn std::error::Error> {
    CoreError::NotFound { id }.into()
}

pub fn run(action: TaskAction, config: &Config) -> CliResult {
    let mut session = open_session(config)?;

    match action {
        TaskAction::Create {
            name,
            estimated,
            completed,
            note,
            tags,
        } => {
            let mut new_task = NewTask::new(name, estimated).with_completed(completed);
            if let Some(note) = note {
                new_task = new_task.with_note(note);
            }
            if let Some(tags) = tags {
                new_task = new_task.with_tags(split_tags(&tags));
            }
            let (task, _) = session.create_task(new_task)?;
            print_json(&task)?;
        }
        TaskAction::List => {
            let tasks = session.tasks().list_active()?;
            print_json(&tasks)?;
        }
        TaskAction::Get { id } => match session.tasks().get(&id)? {
            Some(task) => print_json(&task)?,
            None => return Err(not_found(id)),
        },
        TaskAction::Update {
            id,
            name,
            estimated,
            completed,
            note,
            clear_note,
            tags,
        } => {
            let patch = TaskPatch {
                name,
                estimated_pomodoros: estimated,
                completed_pomodoros: completed,
                note: if clear_note { Some(None) } else { note.map(Some) },
                tags: tags.as_deref().map(split_tags),
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            let task = session.tasks().update(&id, patch)?;
            print_json(&task)?;
        }
        TaskAction::Delete { id } => {
            if session.tasks().get(&id)?.is_none() {
                return Err(not_found(id));
            }
            let events = session.delete_task(&id)?;
            print_json(&json!({ "deleted": id, "events": events }))?;
        }
        TaskAction::Complete { id } => {
            let events = session.toggle_complete(&id)?;
            if events.is_empty() {
                return Err(format!("task {id} is missing or already complete").into());
            }
            print_json(&events)?;
        }
        TaskAction::Credit { id } => match session.tasks().increment_completed_count(&id)? {
            Some(task) => print_json(&task)?,
            None => return Err(not_found(id)),
        },
    }
    Ok(())
}
