use clap::Subcommand;
use pomofoco_core::storage::IntervalCounter;
use pomofoco_core::Config;
use serde_json::json;

use super::{open_database, print_json, CliResult};

#[derive(Subcommand)]
pub enum CounterAction {
    /// Show the interval counter and the long-break period
    Show,
    /// Set the interval counter to zero
    Reset,
}

pub fn run(action: CounterAction, config: &Config) -> CliResult {
    let db = open_database(config)?;
    let counter = IntervalCounter::new(&db);

    match action {
        CounterAction::Show => print_json(&json!({
            "counter": counter.load()?,
            "longBreakPeriod": counter.load_period()?,
        }))?,
        CounterAction::Reset => {
            counter.save(0)?;
            println!("counter reset");
        }
    }
    Ok(())
}
