use std::time::Duration;

use clap::Subcommand;
use pomofoco_core::{Config, CoreError, Database, Event, Mode, NewTask, Session, TickToken};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::debug;

use super::{open_session, print_event, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print the session state as JSON
    Status,
    /// Start the focus countdown and run it in the foreground
    Start,
    /// Run the timer in the foreground, reading commands from stdin
    ///
    /// Commands: start, pause, reset, foco, pausa, descanso, status, quit,
    /// select <id>, create <name> [estimate], delete <id>, complete <id>.
    /// `wait` holds further input until the running countdown ends. At end of
    /// input the running countdown is finished before exiting.
    Run,
    /// Reset the session: foco at full duration, counters at zero
    Reset,
    /// Switch mode (foco, pausa, descanso)
    Mode {
        mode: Mode,
    },
}

pub fn run(action: TimerAction, config: &Config) -> CliResult {
    let mut session = open_session(config)?;

    match action {
        TimerAction::Status => print_json(&Event::StateSnapshot(session.snapshot()))?,
        TimerAction::Start => run_foreground(&mut session, config.timer.tick_ms, true)?,
        TimerAction::Run => run_foreground(&mut session, config.timer.tick_ms, false)?,
        TimerAction::Reset => print_json(&session.reset()?)?,
        TimerAction::Mode { mode } => print_json(&session.change_mode(mode))?,
    }
    Ok(())
}

fn run_foreground(session: &mut Session<Database>, tick_ms: u64, autostart: bool) -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(timer_loop(session, Duration::from_millis(tick_ms), autostart));
    // A stdin read may still be parked on the blocking pool after `quit`.
    runtime.shutdown_background();
    result
}

/// The ticker of the running countdown. Dropped whenever the session's token
/// changes, so a paused timer has no pending tick.
struct Ticker {
    token: TickToken,
    interval: Interval,
}

async fn next_tick(ticker: &mut Option<Ticker>) -> Option<TickToken> {
    match ticker {
        Some(t) => {
            t.interval.tick().await;
            Some(t.token)
        }
        None => std::future::pending().await,
    }
}

async fn timer_loop(session: &mut Session<Database>, period: Duration, autostart: bool) -> CliResult {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut waiting = false;
    let mut ticker: Option<Ticker> = None;

    print_event(&Event::StateSnapshot(session.snapshot()))?;
    if autostart {
        if let Some(event) = session.start() {
            print_event(&event)?;
        }
    }

    loop {
        match (session.token(), ticker.as_ref().map(|t| t.token)) {
            (Some(token), current) if current != Some(token) => {
                debug!(?token, "ticker armed");
                let mut interval = interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                ticker = Some(Ticker { token, interval });
            }
            (None, Some(_)) => ticker = None,
            _ => {}
        }
        if !session.is_running() {
            if !stdin_open {
                break;
            }
            waiting = false;
        }

        tokio::select! {
            Some(token) = next_tick(&mut ticker) => {
                for event in session.tick(token)? {
                    print_event(&event)?;
                }
            }
            line = lines.next_line(), if stdin_open && !waiting => match line? {
                Some(line) => match handle_line(session, line.trim())? {
                    Flow::Continue => {}
                    Flow::Wait => waiting = true,
                    Flow::Quit => break,
                },
                None => stdin_open = false,
            },
        }
    }
    Ok(())
}

/// What the loop does after a stdin command.
enum Flow {
    Continue,
    /// Stop reading input until the countdown ends.
    Wait,
    Quit,
}

/// Apply one stdin command. Rejected commands are reported on stderr and
/// the loop carries on.
fn handle_line(session: &mut Session<Database>, line: &str) -> Result<Flow, Box<dyn std::error::Error>> {
    let (command, arg) = match line.split_once(' ') {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };
    let result = match command {
        "" => Ok(Vec::new()),
        "quit" | "exit" => return Ok(Flow::Quit),
        "wait" => return Ok(Flow::Wait),
        "start" => Ok(session.start().into_iter().collect()),
        "pause" => Ok(session.pause().into_iter().collect()),
        "reset" => session.reset(),
        "status" => Ok(vec![Event::StateSnapshot(session.snapshot())]),
        "select" if !arg.is_empty() => session.select_task(arg).map(|event| vec![event]),
        "create" if !arg.is_empty() => {
            let (name, estimated) = parse_create(arg);
            session
                .create_task(NewTask::new(name, estimated))
                .map(|(_, events)| events)
        }
        "delete" if !arg.is_empty() => {
            existing(session, arg).and_then(|()| session.delete_task(arg))
        }
        "complete" if !arg.is_empty() => {
            existing(session, arg).and_then(|()| session.toggle_complete(arg))
        }
        other => match other.parse::<Mode>() {
            Ok(mode) => Ok(vec![session.change_mode(mode)]),
            Err(_) => {
                eprintln!("unknown command: {line}");
                Ok(Vec::new())
            }
        },
    };
    match result {
        Ok(events) => {
            for event in &events {
                print_event(event)?;
            }
        }
        Err(e) => eprintln!("error: {e}"),
    }
    Ok(Flow::Continue)
}

/// `<name> [estimate]`: a trailing number is the estimate, 1 otherwise.
fn parse_create(arg: &str) -> (&str, u32) {
    match arg.rsplit_once(' ') {
        Some((name, n)) => match n.parse() {
            Ok(estimated) => (name.trim(), estimated),
            Err(_) => (arg, 1),
        },
        None => (arg, 1),
    }
}

fn existing(session: &Session<Database>, id: &str) -> Result<(), CoreError> {
    match session.tasks().get(id)? {
        Some(_) => Ok(()),
        None => Err(CoreError::NotFound { id: id.to_string() }),
    }
}

