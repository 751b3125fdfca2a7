use tracing::{debug, warn};

use super::{keys, KvStore};
use crate::error::StorageError;
use crate::timer::DEFAULT_LONG_BREAK_PERIOD;

/// Counter value used when nothing is stored.
///
/// Starts at 1, not 0: with the default period the fourth focus interval of a
/// fresh install is followed by a long break.
pub const DEFAULT_INTERVAL_COUNTER: u32 = 1;

/// Completed work cycles (`pomodoroCounter`) and the long-break period
/// (`descansoPeriod`), both stored as plain integers.
pub struct IntervalCounter<'a, S: KvStore + ?Sized> {
    kv: &'a S,
}

impl<'a, S: KvStore + ?Sized> IntervalCounter<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self { kv }
    }

    pub fn load(&self) -> Result<u32, StorageError> {
        Ok(self
            .load_u32(keys::POMODORO_COUNTER)?
            .unwrap_or(DEFAULT_INTERVAL_COUNTER))
    }

    pub fn save(&self, value: u32) -> Result<(), StorageError> {
        self.kv.set(keys::POMODORO_COUNTER, &value.to_string())
    }

    /// Read, add one, persist. Returns the new value.
    pub fn increment(&self) -> Result<u32, StorageError> {
        let next = self.load()?.saturating_add(1);
        self.save(next)?;
        debug!(counter = next, "interval counter incremented");
        Ok(next)
    }

    /// Long-break period; zero or unreadable values fall back to the default.
    pub fn load_period(&self) -> Result<u32, StorageError> {
        Ok(self
            .load_u32(keys::DESCANSO_PERIOD)?
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_LONG_BREAK_PERIOD))
    }

    pub fn save_period(&self, period: u32) -> Result<(), StorageError> {
        self.kv.set(keys::DESCANSO_PERIOD, &period.to_string())
    }

    fn load_u32(&self, key: &str) -> Result<Option<u32>, StorageError> {
        let Some(raw) = self.kv.get(key)? else {
            return Ok(None);
        };
        match raw.trim().parse::<u32>() {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!(key, value = %raw, error = %e, "malformed counter value, using default");
                Ok(None)
            }
        }
    }
}
