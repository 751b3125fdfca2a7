//! Countdown state machine.
//!
//! The engine owns the current mode, the remaining seconds and the running
//! flag. It has no clock and no thread: a scheduler calls [`TimerEngine::tick`]
//! once per second while the timer runs, passing the [`TickToken`] it received
//! when the countdown started.
//!
//! ## Tick sessions
//!
//! ```text
//! start() ──> token N ──> tick(N) ... tick(N) ──> Expired
//!                 │
//!        pause() / enter_mode() / set_durations()
//!                 └──> token N is stale, tick(N) is ignored
//! ```
//!
//! Mode transitions are decided by the caller (see `Session`), which reacts
//! to [`Tick::Expired`] by calling [`TimerEngine::enter_mode`].

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::{Mode, ModeDurations};
use crate::events::Event;

/// Identifies one running countdown. Ticks carrying an older token are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickToken(u64);

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Timer not running, stale token, or expiry already handled.
    Ignored,
    /// One second elapsed.
    Counted { remaining_secs: u32 },
    /// The countdown of `mode` reached zero. Fired once per countdown.
    Expired { mode: Mode },
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    durations: ModeDurations,
    mode: Mode,
    remaining_secs: u32,
    running: bool,
    /// Set when the current countdown fired its expiry.
    transitioned: bool,
    tick_session: u64,
}

impl TimerEngine {
    /// Create an engine in `foco`, paused, at full duration.
    pub fn new(durations: ModeDurations) -> Self {
        Self {
            durations,
            mode: Mode::Foco,
            remaining_secs: durations.foco,
            running: false,
            transitioned: false,
            tick_session: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u32 {
        self.durations.get(self.mode)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn durations(&self) -> ModeDurations {
        self.durations
    }

    /// Token for the current countdown, if the timer is running.
    pub fn token(&self) -> Option<TickToken> {
        self.running.then_some(TickToken(self.tick_session))
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.tick_session += 1;
        Some(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.stop();
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Switch to `mode` at full duration and stop. Returns the previous mode.
    pub fn enter_mode(&mut self, mode: Mode) -> Mode {
        let previous = self.mode;
        self.mode = mode;
        self.remaining_secs = self.durations.get(mode);
        self.transitioned = false;
        self.stop();
        previous
    }

    /// Replace the durations, restarting the current mode's countdown stopped.
    pub fn set_durations(&mut self, durations: ModeDurations) {
        self.durations = durations;
        self.enter_mode(self.mode);
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self, token: TickToken) -> Tick {
        if !self.running || token.0 != self.tick_session {
            return Tick::Ignored;
        }
        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            self.stop();
            if self.transitioned {
                return Tick::Ignored;
            }
            self.transitioned = true;
            return Tick::Expired { mode: self.mode };
        }
        self.remaining_secs -= 1;
        Tick::Counted {
            remaining_secs: self.remaining_secs,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Clear the running flag and invalidate any outstanding token.
    fn stop(&mut self) {
        self.running = false;
        self.tick_session += 1;
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(ModeDurations::default())
    }
}
