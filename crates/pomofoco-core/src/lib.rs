//! # Pomofoco Core Library
//!
//! Core logic of the Pomofoco pomodoro timer: a three-mode countdown
//! (`foco`, `pausa`, `descanso`), a task list, and the binding that credits
//! the active task each time a focus interval completes. The CLI binary is a
//! thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a clockless countdown state machine. The caller ticks it
//!   once per second with the token it got when the countdown started
//! - **Session**: owns the engine and the store, decides mode transitions,
//!   and routes interval completions to the task list
//! - **Storage**: a key-value port with SQLite and in-memory adapters, plus
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Session`]: the pomodoro session and its operations
//! - [`TimerEngine`]: countdown state machine
//! - [`TaskEngine`]: task list operations
//! - [`Database`]: SQLite persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod session;
pub mod settings;
pub mod storage;
pub mod task;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{Event, ModeChangeReason};
pub use session::{Session, Snapshot};
pub use settings::SettingsForm;
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use task::{NewTask, Task, TaskEngine, TaskPatch, TaskSummary};
pub use timer::{Mode, ModeDurations, Tick, TickToken, TimerEngine};
