mod engine;
mod mode;

pub use engine::{Tick, TickToken, TimerEngine};
pub use mode::{long_break_due, Mode, ModeDurations, DEFAULT_LONG_BREAK_PERIOD};
