//! The settings flow: four integers collected from the user, validated as a
//! whole, then converted to stored durations.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::ModeDurations;

/// Settings as entered by the user. Durations are in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsForm {
    pub foco_minutes: u32,
    pub pausa_minutes: u32,
    pub descanso_minutes: u32,
    pub long_break_period: u32,
}

impl SettingsForm {
    /// Pre-fill the form from the values in effect.
    pub fn from_current(durations: &ModeDurations, long_break_period: u32) -> Self {
        Self {
            foco_minutes: durations.foco / 60,
            pausa_minutes: durations.pausa / 60,
            descanso_minutes: durations.descanso / 60,
            long_break_period,
        }
    }

    /// Validate every field, then convert minutes to seconds.
    ///
    /// # Errors
    /// The first field outside its range: foco 1–120 min, pausa and descanso
    /// 1–60 min, long-break period at least 1.
    pub fn validate(&self) -> Result<(ModeDurations, u32), ValidationError> {
        ValidationError::check_range("foco", self.foco_minutes, 1, 120)?;
        ValidationError::check_range("pausa", self.pausa_minutes, 1, 60)?;
        ValidationError::check_range("descanso", self.descanso_minutes, 1, 60)?;
        validate_long_break_period(self.long_break_period)?;
        let durations = ModeDurations {
            foco: self.foco_minutes * 60,
            pausa: self.pausa_minutes * 60,
            descanso: self.descanso_minutes * 60,
        };
        Ok((durations, self.long_break_period))
    }
}

pub(crate) fn validate_long_break_period(period: u32) -> Result<(), ValidationError> {
    if period < 1 {
        return Err(ValidationError::BelowMinimum {
            field: "descansoPeriod",
            min: 1,
            value: period,
        });
    }
    Ok(())
}
