use clap::Subcommand;
use pomofoco_core::Config;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show durations (minutes) and the long-break period
    Show,
    /// Change settings; omitted values keep their current setting
    Set {
        /// Focus minutes (1-120)
        #[arg(long)]
        foco: Option<u32>,
        /// Short break minutes (1-60)
        #[arg(long)]
        pausa: Option<u32>,
        /// Long break minutes (1-60)
        #[arg(long)]
        descanso: Option<u32>,
        /// Focus intervals between long breaks (at least 1)
        #[arg(long)]
        period: Option<u32>,
    },
}

pub fn run(action: SettingsAction, config: &Config) -> CliResult {
    let mut session = open_session(config)?;

    match action {
        SettingsAction::Show => print_json(&session.settings_form())?,
        SettingsAction::Set {
            foco,
            pausa,
            descanso,
            period,
        } => {
            let mut form = session.settings_form();
            form.foco_minutes = foco.unwrap_or(form.foco_minutes);
            form.pausa_minutes = pausa.unwrap_or(form.pausa_minutes);
            form.descanso_minutes = descanso.unwrap_or(form.descanso_minutes);
            form.long_break_period = period.unwrap_or(form.long_break_period);
            print_json(&session.apply_settings(form)?)?;
        }
    }
    Ok(())
}
