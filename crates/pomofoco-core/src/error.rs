//! Core error types for pomofoco-core.
//!
//! Every fallible operation in the library returns [`CoreError`] (through the
//! [`Result`] alias). Missing task ids are usually *not* errors: most task
//! operations report them as `false` or `None`, since ids go stale easily.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomofoco-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Rejected input; the prior state is retained
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Task id absent from the collection the operation targets
    #[error("Task not found: {id}")]
    NotFound { id: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task name is empty after trimming
    #[error("Task name must not be empty")]
    EmptyName,

    /// Numeric value outside its documented range
    #[error("Invalid value for '{field}': {value} (expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },

    /// Numeric value below its minimum (no upper bound)
    #[error("Invalid value for '{field}': {value} (must be at least {min})")]
    BelowMinimum {
        field: &'static str,
        min: u32,
        value: u32,
    },

    /// completedPomodoros would exceed estimatedPomodoros
    #[error("Completed pomodoros ({completed}) cannot exceed the estimate ({estimated})")]
    CompletedExceedsEstimate { completed: u32, estimated: u32 },
}

impl ValidationError {
    /// Check `value` against an inclusive range.
    pub fn check_range(
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    ) -> Result<(), ValidationError> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field,
                min,
                max,
                value,
            })
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
