pub mod completed;
pub mod config;
pub mod counter;
pub mod settings;
pub mod summary;
pub mod task;
pub mod timer;

use pomofoco_core::{Config, Database, Event, Session};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the database named in the config, inside the data directory.
pub fn open_database(config: &Config) -> Result<Database, Box<dyn std::error::Error>> {
    Ok(Database::open(&config.storage.database_file)?)
}

pub fn open_session(config: &Config) -> Result<Session<Database>, Box<dyn std::error::Error>> {
    Ok(Session::open(open_database(config)?)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One event per line, for streaming output.
pub fn print_event(event: &Event) -> CliResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}
