use clap::Subcommand;
use pomofoco_core::{Config, CoreError, TaskEngine};

use super::{open_database, print_json, CliResult};

#[derive(Subcommand)]
pub enum CompletedAction {
    /// List completed tasks, most recent first
    List,
    /// Delete a completed task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: CompletedAction, config: &Config) -> CliResult {
    let db = open_database(config)?;
    let tasks = TaskEngine::new(&db);

    match action {
        CompletedAction::List => print_json(&tasks.list_completed_recent()?)?,
        CompletedAction::Delete { id } => {
            if !tasks.delete_completed(&id)? {
                return Err(CoreError::NotFound { id }.into());
            }
            println!("Completed task deleted: {id}");
        }
    }
    Ok(())
}
