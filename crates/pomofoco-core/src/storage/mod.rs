//! Persistence for pomofoco.
//!
//! All state lives behind the [`KvStore`] port: a string-keyed store of JSON or
//! plain-number values. Typed stores ([`DurationStore`], [`IntervalCounter`],
//! [`TaskStore`]) borrow a `KvStore` and own one or two keys each.

pub mod config;
pub mod counter;
pub mod database;
pub mod durations;
pub mod memory;
pub mod tasks;

pub use config::Config;
pub use counter::IntervalCounter;
pub use database::Database;
pub use durations::DurationStore;
pub use memory::MemoryStore;
pub use tasks::TaskStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

use crate::error::StorageError;

/// Store keys.
pub mod keys {
    pub const DURATIONS: &str = "durations";
    pub const POMODORO_COUNTER: &str = "pomodoroCounter";
    pub const DESCANSO_PERIOD: &str = "descansoPeriod";
    pub const TASKS: &str = "tasks";
    pub const COMPLETED_TASKS: &str = "completedTasks";
}

/// String key-value persistence port.
///
/// Writes are immediate; there is a single writer, so no isolation is offered.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Write several keys, in order.
    ///
    /// Adapters that can should apply the whole batch or none of it. The
    /// default writes one key at a time and stops at the first failure, so
    /// callers put the write they can least afford to duplicate first.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        (**self).set_many(entries)
    }
}

/// Read `key` as JSON, falling back to `default()` when absent or malformed.
pub(crate) fn load_json_or<S, T, F>(kv: &S, key: &str, default: F) -> Result<T, StorageError>
where
    S: KvStore + ?Sized,
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    let Some(raw) = kv.get(key)? else {
        return Ok(default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!(key, error = %e, "malformed stored value, falling back to default");
            Ok(default())
        }
    }
}

pub(crate) fn save_json<S, T>(kv: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    S: KvStore + ?Sized,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    kv.set(key, &json)
}

/// Returns the data directory, creating it if needed.
///
/// `POMOFOCO_DATA_DIR` overrides the location. Otherwise
/// `~/.config/pomofoco[-dev]/` based on POMOFOCO_ENV.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("POMOFOCO_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("POMOFOCO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomofoco-dev")
            } else {
                base_dir.join("pomofoco")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_json_or_uses_default_when_absent() {
        let store = MemoryStore::new();
        let value: Vec<u32> = load_json_or(&store, "missing", || vec![7]).unwrap();
        assert_eq!(value, vec![7]);
    }

    #[test]
    fn load_json_or_fails_closed_on_garbage() {
        let store = MemoryStore::new();
        store.set("numbers", "{not json").unwrap();
        let value: Vec<u32> = load_json_or(&store, "numbers", Vec::new).unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn save_then_load_json() {
        let store = MemoryStore::new();
        save_json(&store, "numbers", &[1u32, 2, 3]).unwrap();
        let value: Vec<u32> = load_json_or(&store, "numbers", Vec::new).unwrap();
        assert_eq!(value, vec![1, 2, 3]);
    }
}
