use clap::{Parser, Subcommand};
use pomofoco_core::Config;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pomofoco", version, about = "Pomofoco pomodoro timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Completed task history
    Completed {
        #[command(subcommand)]
        action: commands::completed::CompletedAction,
    },
    /// Mode durations and long-break period
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Interval counter
    Counter {
        #[command(subcommand)]
        action: commands::counter::CounterAction,
    },
    /// Remaining work estimate over the active tasks
    Summary,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// `RUST_LOG` wins; otherwise the configured filter. Logs go to stderr so
/// stdout stays machine-readable.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_tracing(&config);
    if let Some(e) = config_error {
        warn!(error = %e, "using default configuration");
    }

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &config),
        Commands::Task { action } => commands::task::run(action, &config),
        Commands::Completed { action } => commands::completed::run(action, &config),
        Commands::Settings { action } => commands::settings::run(action, &config),
        Commands::Counter { action } => commands::counter::run(action, &config),
        Commands::Summary => commands::summary::run(&config),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
