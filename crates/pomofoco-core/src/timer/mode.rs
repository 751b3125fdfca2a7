use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Default long-break period: a `descanso` every 4th work cycle.
pub const DEFAULT_LONG_BREAK_PERIOD: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Focus interval.
    Foco,
    /// Short break.
    Pausa,
    /// Long break.
    Descanso,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Foco, Mode::Pausa, Mode::Descanso];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Foco => "foco",
            Mode::Pausa => "pausa",
            Mode::Descanso => "descanso",
        }
    }

    /// Status line shown next to the countdown.
    pub fn status_text(&self) -> &'static str {
        match self {
            Mode::Foco => "Hora de focar",
            Mode::Pausa => "Hora de fazer uma pausa",
            Mode::Descanso => "Hora de descansar",
        }
    }

    /// Allowed duration range for this mode, in seconds.
    pub fn duration_range_secs(&self) -> (u32, u32) {
        match self {
            Mode::Foco => (60, 120 * 60),
            Mode::Pausa | Mode::Descanso => (60, 60 * 60),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "foco" => Ok(Mode::Foco),
            "pausa" => Ok(Mode::Pausa),
            "descanso" => Ok(Mode::Descanso),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Length of each mode, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDurations {
    pub foco: u32,
    pub pausa: u32,
    pub descanso: u32,
}

impl Default for ModeDurations {
    fn default() -> Self {
        Self {
            foco: 25 * 60,
            pausa: 5 * 60,
            descanso: 15 * 60,
        }
    }
}

impl ModeDurations {
    pub fn get(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Foco => self.foco,
            Mode::Pausa => self.pausa,
            Mode::Descanso => self.descanso,
        }
    }

    /// Check every duration against its mode's range.
    ///
    /// # Errors
    /// Returns the first out-of-range value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for mode in Mode::ALL {
            let (min, max) = mode.duration_range_secs();
            ValidationError::check_range(mode.as_str(), self.get(mode), min, max)?;
        }
        Ok(())
    }
}

/// Whether a focus expiry with `counter` completed work cycles is due a long break.
///
/// Only positive multiples of `period` qualify.
pub fn long_break_due(counter: u32, period: u32) -> bool {
    period > 0 && counter > 0 && counter % period == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_durations() {
        let d = ModeDurations::default();
        assert_eq!(d.foco, 1500);
        assert_eq!(d.pausa, 300);
        assert_eq!(d.descanso, 900);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn validate_rejects_long_pausa() {
        let d = ModeDurations {
            pausa: 61 * 60,
            ..ModeDurations::default()
        };
        assert!(matches!(
            d.validate(),
            Err(ValidationError::OutOfRange { field: "pausa", .. })
        ));
    }

    #[test]
    fn validate_accepts_two_hour_focus() {
        let d = ModeDurations {
            foco: 120 * 60,
            ..ModeDurations::default()
        };
        assert!(d.validate().is_ok());
    }

    #[test]
    fn long_break_only_on_positive_multiples() {
        assert!(!long_break_due(0, 4));
        assert!(!long_break_due(3, 4));
        assert!(long_break_due(4, 4));
        assert!(long_break_due(8, 4));
        assert!(long_break_due(1, 1));
        assert!(!long_break_due(4, 0));
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Descanso".parse::<Mode>().unwrap(), Mode::Descanso);
        assert!("nap".parse::<Mode>().is_err());
    }

    #[test]
    fn durations_serialize_with_mode_keys() {
        let json = serde_json::to_value(ModeDurations::default()).unwrap();
        assert_eq!(json["foco"], 1500);
        assert_eq!(json["descanso"], 900);
    }
}
