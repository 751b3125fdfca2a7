//! Pomodoro session: the timer, the interval counters and the active task.
//!
//! A [`Session`] owns its [`KvStore`] and the in-memory [`TimerEngine`].
//! Operations return the [`Event`]s they caused, in order. Persisted values
//! (durations, counter, long-break period, tasks) are written before the
//! operation returns.
//!
//! ## Interval cycle
//!
//! ```text
//! foco ──expire──> work count += 1, credit active task
//!                  ├─ counter % period == 0 ──> descanso
//!                  └─ otherwise ─────────────> pausa
//! pausa | descanso ──expire──> counter += 1 ──> foco
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::events::{Event, ModeChangeReason};
use crate::settings::{validate_long_break_period, SettingsForm};
use crate::storage::{DurationStore, IntervalCounter, KvStore};
use crate::task::{NewTask, Task, TaskEngine};
use crate::timer::{long_break_due, Mode, ModeDurations, Tick, TickToken, TimerEngine};

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub remaining_secs: u32,
    pub total_secs: u32,
    pub running: bool,
    pub work_interval_count: u32,
    pub interval_counter: u32,
    pub long_break_period: u32,
    pub active_task_id: Option<String>,
    pub at: DateTime<Utc>,
}

impl Snapshot {
    /// Remaining time as `MM:SS`.
    pub fn clock(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    /// Window title: `MM:SS - <status text>`.
    pub fn title(&self) -> String {
        format!("{} - {}", self.clock(), self.mode.status_text())
    }
}

pub struct Session<S: KvStore> {
    store: S,
    engine: TimerEngine,
    long_break_period: u32,
    /// Cached copy of the persisted interval counter.
    interval_counter: u32,
    /// Focus intervals completed since the session was opened or reset.
    work_interval_count: u32,
    active_task_id: Option<String>,
}

impl<S: KvStore> Session<S> {
    /// Load durations, counter and long-break period, and select the first
    /// incomplete task.
    pub fn open(store: S) -> Result<Self> {
        let durations = DurationStore::new(&store).load()?;
        let counter = IntervalCounter::new(&store);
        let interval_counter = counter.load()?;
        let long_break_period = counter.load_period()?;
        let active_task_id = TaskEngine::new(&store).first_incomplete()?;
        info!(
            interval_counter,
            long_break_period,
            active_task = ?active_task_id,
            "session opened"
        );
        Ok(Self {
            store,
            engine: TimerEngine::new(durations),
            long_break_period,
            interval_counter,
            work_interval_count: 0,
            active_task_id,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tasks(&self) -> TaskEngine<'_, S> {
        TaskEngine::new(&self.store)
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.engine.remaining_secs()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn durations(&self) -> ModeDurations {
        self.engine.durations()
    }

    pub fn long_break_period(&self) -> u32 {
        self.long_break_period
    }

    pub fn interval_counter(&self) -> u32 {
        self.interval_counter
    }

    pub fn work_interval_count(&self) -> u32 {
        self.work_interval_count
    }

    pub fn active_task_id(&self) -> Option<&str> {
        self.active_task_id.as_deref()
    }

    /// Token of the running countdown, if any.
    pub fn token(&self) -> Option<TickToken> {
        self.engine.token()
    }

    pub fn settings_form(&self) -> SettingsForm {
        SettingsForm::from_current(&self.durations(), self.long_break_period)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.engine.mode(),
            remaining_secs: self.engine.remaining_secs(),
            total_secs: self.engine.total_secs(),
            running: self.engine.is_running(),
            work_interval_count: self.work_interval_count,
            interval_counter: self.interval_counter,
            long_break_period: self.long_break_period,
            active_task_id: self.active_task_id.clone(),
            at: Utc::now(),
        }
    }

    // ── Timer commands ───────────────────────────────────────────────

    /// Start the countdown. `None` if it was already running.
    pub fn start(&mut self) -> Option<Event> {
        self.engine.start()
    }

    /// Pause the countdown. `None` if it was not running.
    pub fn pause(&mut self) -> Option<Event> {
        self.engine.pause()
    }

    /// Switch mode by hand: full duration, stopped, counters untouched.
    pub fn change_mode(&mut self, mode: Mode) -> Event {
        self.enter_mode(mode, ModeChangeReason::Manual)
    }

    /// Back to `foco` at full duration with both counters at zero.
    ///
    /// The in-memory state is reset even when persisting the counter fails.
    pub fn reset(&mut self) -> Result<Vec<Event>> {
        let changed = self.enter_mode(Mode::Foco, ModeChangeReason::Reset);
        self.work_interval_count = 0;
        self.interval_counter = 0;
        IntervalCounter::new(&self.store).save(0)?;
        info!("session reset");
        Ok(vec![changed, Event::SessionReset { at: Utc::now() }])
    }

    /// Advance the running countdown by one second.
    ///
    /// Returns nothing for an ordinary second or an ignored tick. On expiry
    /// returns `IntervalCompleted`, the task events of a finished `foco`, and
    /// the `ModeChanged` into the next mode, which is left stopped.
    pub fn tick(&mut self, token: TickToken) -> Result<Vec<Event>> {
        match self.engine.tick(token) {
            Tick::Ignored | Tick::Counted { .. } => Ok(Vec::new()),
            Tick::Expired { mode } => self.on_expired(mode),
        }
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Validate, persist and apply new durations. The current mode restarts
    /// stopped at its new full duration.
    pub fn update_durations(&mut self, durations: ModeDurations) -> Result<Vec<Event>> {
        durations.validate()?;
        DurationStore::new(&self.store).save(&durations)?;
        let changed = self.apply_durations(durations);
        info!(?durations, "durations updated");
        Ok(vec![changed, self.settings_updated()])
    }

    pub fn update_long_break_period(&mut self, period: u32) -> Result<Event> {
        validate_long_break_period(period)?;
        IntervalCounter::new(&self.store).save_period(period)?;
        self.long_break_period = period;
        info!(period, "long-break period updated");
        Ok(self.settings_updated())
    }

    /// Apply a settings form. Nothing is persisted unless every field is valid.
    pub fn apply_settings(&mut self, form: SettingsForm) -> Result<Vec<Event>> {
        let (durations, period) = form.validate()?;
        DurationStore::new(&self.store).save(&durations)?;
        IntervalCounter::new(&self.store).save_period(period)?;
        self.long_break_period = period;
        let changed = self.apply_durations(durations);
        info!(?durations, period, "settings applied");
        Ok(vec![changed, self.settings_updated()])
    }

    // ── Active task ──────────────────────────────────────────────────

    /// Toggle the selection: selecting the active task clears it.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] if `id` is not an active task.
    pub fn select_task(&mut self, id: &str) -> Result<Event> {
        let to = if self.active_task_id.as_deref() == Some(id) {
            None
        } else if self.tasks().get(id)?.is_some() {
            Some(id.to_string())
        } else {
            return Err(CoreError::NotFound { id: id.to_string() });
        };
        Ok(self.set_active(to))
    }

    /// Create an active task. With nothing selected, the new task becomes the
    /// active one.
    pub fn create_task(&mut self, new_task: NewTask) -> Result<(Task, Vec<Event>)> {
        let task = self.tasks().create(new_task)?;
        let mut events = vec![Event::TaskCreated {
            task_id: task.id.clone(),
            name: task.name.clone(),
            at: task.created_at,
        }];
        if self.active_task_id.is_none() {
            events.push(self.set_active(Some(task.id.clone())));
        }
        Ok((task, events))
    }

    /// Delete an active task. Deleting the selected task clears the selection
    /// until the next focus interval completes.
    pub fn delete_task(&mut self, id: &str) -> Result<Vec<Event>> {
        if !self.tasks().delete(id)? {
            return Ok(Vec::new());
        }
        if self.active_task_id.as_deref() == Some(id) {
            return Ok(vec![self.set_active(None)]);
        }
        Ok(Vec::new())
    }

    /// Mark a task done. If it was selected, the first incomplete task is
    /// selected in its place.
    pub fn toggle_complete(&mut self, id: &str) -> Result<Vec<Event>> {
        let Some(task) = self.tasks().toggle_complete(id)? else {
            return Ok(Vec::new());
        };
        let mut events = vec![Event::TaskCompleted {
            task_id: task.id,
            name: task.name,
            at: Utc::now(),
        }];
        if self.active_task_id.as_deref() == Some(id) {
            let next = self.tasks().first_incomplete()?;
            events.push(self.set_active(next));
        }
        Ok(events)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn on_expired(&mut self, mode: Mode) -> Result<Vec<Event>> {
        let at = Utc::now();
        info!(%mode, "interval completed");
        let next = match mode {
            Mode::Foco if long_break_due(self.interval_counter, self.long_break_period) => {
                Mode::Descanso
            }
            Mode::Foco => Mode::Pausa,
            Mode::Pausa | Mode::Descanso => Mode::Foco,
        };
        // The next mode is entered even if a side effect fails, so the
        // session never stays stuck on an expired countdown.
        let effects = self.expiry_effects(mode, at);
        let changed = self.enter_mode(next, ModeChangeReason::Expired);

        let mut events = vec![Event::IntervalCompleted { mode, at }];
        events.extend(effects?);
        events.push(changed);
        Ok(events)
    }

    fn expiry_effects(&mut self, mode: Mode, at: DateTime<Utc>) -> Result<Vec<Event>> {
        match mode {
            Mode::Foco => {
                self.work_interval_count += 1;
                let completed = Event::WorkIntervalCompleted {
                    work_interval_count: self.work_interval_count,
                    active_task_id: self.active_task_id.clone(),
                    at,
                };
                let follow_up = self.dispatch(&completed)?;
                let mut events = vec![completed];
                events.extend(follow_up);
                Ok(events)
            }
            Mode::Pausa | Mode::Descanso => {
                self.interval_counter = IntervalCounter::new(&self.store).increment()?;
                Ok(Vec::new())
            }
        }
    }

    /// Route internal events to their subscribers.
    fn dispatch(&mut self, event: &Event) -> Result<Vec<Event>> {
        match event {
            Event::WorkIntervalCompleted { active_task_id, .. } => {
                self.credit_work_interval(active_task_id.as_deref())
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Credit the active task, sweep finished tasks out of the active
    /// collection, and re-derive the selection if it no longer points at an
    /// active task.
    fn credit_work_interval(&mut self, active: Option<&str>) -> Result<Vec<Event>> {
        let at = Utc::now();
        let tasks = TaskEngine::new(&self.store);
        let mut events = Vec::new();

        if let Some(id) = active {
            match tasks.increment_completed_count(id)? {
                Some(task) => {
                    events.push(Event::TaskCredited {
                        task_id: task.id.clone(),
                        completed_pomodoros: task.completed_pomodoros,
                        estimated_pomodoros: task.estimated_pomodoros,
                        at,
                    });
                    if task.is_complete() {
                        events.push(Event::TaskCompleted {
                            task_id: task.id,
                            name: task.name,
                            at,
                        });
                    }
                }
                None => warn!(task_id = %id, "active task vanished before credit"),
            }
        }
        for task in tasks.sweep_completed()? {
            events.push(Event::TaskCompleted {
                task_id: task.id,
                name: task.name,
                at,
            });
        }

        let still_active = match &self.active_task_id {
            Some(id) => tasks.get(id)?.is_some(),
            None => false,
        };
        if !still_active {
            let next = tasks.first_incomplete()?;
            if next != self.active_task_id {
                events.push(self.set_active(next));
            }
        }
        Ok(events)
    }

    fn enter_mode(&mut self, mode: Mode, reason: ModeChangeReason) -> Event {
        let from = self.engine.enter_mode(mode);
        debug!(%from, to = %mode, ?reason, "mode changed");
        Event::ModeChanged {
            from,
            to: mode,
            reason,
            duration_secs: self.engine.total_secs(),
            at: Utc::now(),
        }
    }

    /// Swap in new durations; the current mode restarts stopped.
    fn apply_durations(&mut self, durations: ModeDurations) -> Event {
        self.engine.set_durations(durations);
        let mode = self.engine.mode();
        Event::ModeChanged {
            from: mode,
            to: mode,
            reason: ModeChangeReason::Settings,
            duration_secs: self.engine.total_secs(),
            at: Utc::now(),
        }
    }

    fn set_active(&mut self, to: Option<String>) -> Event {
        let from = std::mem::replace(&mut self.active_task_id, to.clone());
        debug!(?from, ?to, "active task changed");
        Event::ActiveTaskChanged {
            from,
            to,
            at: Utc::now(),
        }
    }

    fn settings_updated(&self) -> Event {
        Event::SettingsUpdated {
            durations: self.engine.durations(),
            long_break_period: self.long_break_period,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::storage::{keys, MemoryStore};
    use crate::task::TaskPatch;

    fn session() -> Session<MemoryStore> {
        Session::open(MemoryStore::new()).unwrap()
    }

    /// Short durations written straight to the store, bypassing validation.
    fn quick_session() -> Session<MemoryStore> {
        let store = MemoryStore::new();
        DurationStore::new(&store)
            .save(&ModeDurations {
                foco: 3,
                pausa: 2,
                descanso: 2,
            })
            .unwrap();
        Session::open(store).unwrap()
    }

    /// Run the current countdown to expiry and return the events it produced.
    fn finish_interval(session: &mut Session<MemoryStore>) -> Vec<Event> {
        session.start();
        let token = session.token().unwrap();
        for _ in 0..10_000 {
            let events = session.tick(token).unwrap();
            if !events.is_empty() {
                return events;
            }
        }
        panic!("countdown never expired");
    }

    fn credited(events: &[Event]) -> Vec<(String, u32)> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::TaskCredited {
                    task_id,
                    completed_pomodoros,
                    ..
                } => Some((task_id.clone(), *completed_pomodoros)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn opens_with_defaults() {
        let s = session();
        assert_eq!(s.mode(), Mode::Foco);
        assert_eq!(s.remaining_secs(), 1500);
        assert!(!s.is_running());
        assert_eq!(s.interval_counter(), 1);
        assert_eq!(s.long_break_period(), 4);
        assert_eq!(s.work_interval_count(), 0);
        assert_eq!(s.active_task_id(), None);
    }

    #[test]
    fn opens_with_first_incomplete_task_selected() {
        let store = MemoryStore::new();
        let engine = TaskEngine::new(&store);
        engine.create(NewTask::new("Done", 1).with_completed(1)).unwrap();
        let open = engine.create(NewTask::new("Open", 2)).unwrap();
        let s = Session::open(store).unwrap();
        assert_eq!(s.active_task_id(), Some(open.id.as_str()));
    }

    #[test]
    fn full_foco_countdown_moves_to_pausa() {
        let mut s = session();
        s.start();
        let token = s.token().unwrap();
        let mut expired = Vec::new();
        for _ in 0..1500 {
            expired.extend(s.tick(token).unwrap());
        }
        assert_eq!(s.mode(), Mode::Pausa);
        assert_eq!(s.remaining_secs(), 300);
        assert!(!s.is_running());
        assert_eq!(s.work_interval_count(), 1);
        assert!(matches!(
            expired.first(),
            Some(Event::IntervalCompleted { mode: Mode::Foco, .. })
        ));
        assert!(matches!(
            expired.last(),
            Some(Event::ModeChanged {
                from: Mode::Foco,
                to: Mode::Pausa,
                reason: ModeChangeReason::Expired,
                duration_secs: 300,
                ..
            })
        ));
    }

    #[test]
    fn foco_completion_leaves_counter_alone() {
        let mut s = quick_session();
        finish_interval(&mut s);
        assert_eq!(s.interval_counter(), 1);
        assert_eq!(s.store().raw(keys::POMODORO_COUNTER), None);
    }

    #[test]
    fn counter_multiple_of_period_gives_descanso() {
        let store = MemoryStore::new();
        IntervalCounter::new(&store).save(4).unwrap();
        let mut s = Session::open(store).unwrap();
        s.start();
        let token = s.token().unwrap();
        for _ in 0..1500 {
            s.tick(token).unwrap();
        }
        assert_eq!(s.mode(), Mode::Descanso);
        assert_eq!(s.remaining_secs(), 900);
    }

    #[test]
    fn break_completion_increments_counter_and_returns_to_foco() {
        let mut s = quick_session();
        s.change_mode(Mode::Pausa);
        finish_interval(&mut s);
        assert_eq!(s.mode(), Mode::Foco);
        assert_eq!(s.interval_counter(), 2);
        assert_eq!(s.store().raw(keys::POMODORO_COUNTER).as_deref(), Some("2"));

        s.change_mode(Mode::Descanso);
        finish_interval(&mut s);
        assert_eq!(s.interval_counter(), 3);
    }

    #[test]
    fn fresh_install_cycle_gives_descanso_on_fourth_foco() {
        let mut s = quick_session();
        let mut breaks = Vec::new();
        for _ in 0..4 {
            finish_interval(&mut s);
            breaks.push(s.mode());
            finish_interval(&mut s);
        }
        assert_eq!(
            breaks,
            vec![Mode::Pausa, Mode::Pausa, Mode::Pausa, Mode::Descanso]
        );
        assert_eq!(s.work_interval_count(), 4);
    }

    #[test]
    fn pause_and_resume_continue_from_remaining() {
        let mut s = session();
        s.start();
        let first = s.token().unwrap();
        for _ in 0..700 {
            s.tick(first).unwrap();
        }
        assert_eq!(s.remaining_secs(), 800);

        assert!(matches!(
            s.pause(),
            Some(Event::TimerPaused {
                remaining_secs: 800,
                ..
            })
        ));
        assert!(s.tick(first).unwrap().is_empty());
        assert_eq!(s.remaining_secs(), 800);

        assert!(s.start().is_some());
        let second = s.token().unwrap();
        assert!(s.tick(first).unwrap().is_empty());
        s.tick(second).unwrap();
        assert_eq!(s.remaining_secs(), 799);
    }

    #[test]
    fn start_twice_is_a_no_op() {
        let mut s = session();
        assert!(s.start().is_some());
        let token = s.token();
        assert!(s.start().is_none());
        assert_eq!(s.token(), token);
    }

    #[test]
    fn manual_mode_change_stops_and_keeps_counters() {
        let mut s = session();
        s.start();
        let token = s.token().unwrap();
        s.tick(token).unwrap();
        let event = s.change_mode(Mode::Descanso);
        assert!(matches!(
            event,
            Event::ModeChanged {
                reason: ModeChangeReason::Manual,
                duration_secs: 900,
                ..
            }
        ));
        assert!(!s.is_running());
        assert_eq!(s.remaining_secs(), 900);
        assert_eq!(s.interval_counter(), 1);
        assert!(s.tick(token).unwrap().is_empty());
    }

    #[test]
    fn reset_returns_to_initial_state_and_persists_zero() {
        let mut s = quick_session();
        finish_interval(&mut s);
        finish_interval(&mut s);
        s.start();

        let events = s.reset().unwrap();
        assert!(matches!(events.last(), Some(Event::SessionReset { .. })));
        assert_eq!(s.mode(), Mode::Foco);
        assert_eq!(s.remaining_secs(), 3);
        assert!(!s.is_running());
        assert_eq!(s.work_interval_count(), 0);
        assert_eq!(s.interval_counter(), 0);
        assert_eq!(s.store().raw(keys::POMODORO_COUNTER).as_deref(), Some("0"));
    }

    #[test]
    fn counter_zero_after_reset_gives_pausa() {
        let mut s = quick_session();
        s.reset().unwrap();
        finish_interval(&mut s);
        assert_eq!(s.mode(), Mode::Pausa);
    }

    #[test]
    fn expiry_fires_once_per_countdown() {
        let mut s = quick_session();
        s.start();
        let token = s.token().unwrap();
        let mut completions = 0;
        for _ in 0..10 {
            completions += s
                .tick(token)
                .unwrap()
                .iter()
                .filter(|e| matches!(e, Event::IntervalCompleted { .. }))
                .count();
        }
        assert_eq!(completions, 1);
        assert_eq!(s.mode(), Mode::Pausa);
        assert_eq!(s.remaining_secs(), 2);
    }

    #[test]
    fn foco_completion_credits_active_task() {
        let mut s = quick_session();
        let task = s.tasks().create(NewTask::new("Write", 3)).unwrap();
        s.select_task(&task.id).unwrap();

        let events = finish_interval(&mut s);
        assert_eq!(credited(&events), vec![(task.id.clone(), 1)]);
        assert_eq!(s.tasks().get(&task.id).unwrap().unwrap().completed_pomodoros, 1);
        assert_eq!(s.active_task_id(), Some(task.id.as_str()));
    }

    #[test]
    fn break_completion_credits_nothing() {
        let mut s = quick_session();
        let task = s.tasks().create(NewTask::new("Write", 3)).unwrap();
        s.select_task(&task.id).unwrap();
        s.change_mode(Mode::Pausa);

        let events = finish_interval(&mut s);
        assert!(credited(&events).is_empty());
        assert_eq!(s.tasks().get(&task.id).unwrap().unwrap().completed_pomodoros, 0);
    }

    #[test]
    fn completing_active_task_moves_it_and_selects_next() {
        let mut s = quick_session();
        let first = s.tasks().create(NewTask::new("First", 1)).unwrap();
        let second = s.tasks().create(NewTask::new("Second", 2)).unwrap();
        s.select_task(&first.id).unwrap();

        let events = finish_interval(&mut s);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::TaskCompleted { task_id, .. } if *task_id == first.id
        )));
        assert!(s.tasks().get(&first.id).unwrap().is_none());
        assert_eq!(s.tasks().list_completed().unwrap()[0].id, first.id);
        assert_eq!(s.active_task_id(), Some(second.id.as_str()));
    }

    #[test]
    fn deleting_active_task_clears_selection_until_next_foco() {
        let mut s = quick_session();
        let first = s.tasks().create(NewTask::new("First", 2)).unwrap();
        let second = s.tasks().create(NewTask::new("Second", 2)).unwrap();
        s.select_task(&first.id).unwrap();

        let events = s.delete_task(&first.id).unwrap();
        assert!(matches!(
            events.as_slice(),
            [Event::ActiveTaskChanged { to: None, .. }]
        ));
        assert_eq!(s.active_task_id(), None);

        let events = finish_interval(&mut s);
        assert!(credited(&events).is_empty());
        assert_eq!(s.active_task_id(), Some(second.id.as_str()));
        assert_eq!(s.tasks().get(&second.id).unwrap().unwrap().completed_pomodoros, 0);
    }

    #[test]
    fn created_task_becomes_active_when_nothing_is_selected() {
        let mut s = session();
        let (first, events) = s.create_task(NewTask::new("First", 2)).unwrap();
        assert!(matches!(
            events.as_slice(),
            [
                Event::TaskCreated { task_id, .. },
                Event::ActiveTaskChanged { from: None, to: Some(to), .. },
            ] if *task_id == first.id && *to == first.id
        ));
        assert_eq!(s.active_task_id(), Some(first.id.as_str()));

        let (second, events) = s.create_task(NewTask::new("Second", 1)).unwrap();
        assert!(matches!(events.as_slice(), [Event::TaskCreated { .. }]));
        assert_eq!(s.active_task_id(), Some(first.id.as_str()));
        assert_eq!(s.tasks().list_active().unwrap().len(), 2);
        assert_ne!(second.id, first.id);
    }

    #[test]
    fn created_task_is_credited_by_the_next_foco() {
        let mut s = quick_session();
        let (task, _) = s.create_task(NewTask::new("Fresh", 3)).unwrap();
        let events = finish_interval(&mut s);
        assert_eq!(credited(&events), vec![(task.id, 1)]);
    }

    #[test]
    fn invalid_new_task_leaves_selection_alone() {
        let mut s = session();
        assert!(matches!(
            s.create_task(NewTask::new("  ", 1)),
            Err(CoreError::Validation(ValidationError::EmptyName))
        ));
        assert_eq!(s.active_task_id(), None);
    }

    #[test]
    fn deleting_other_task_keeps_selection() {
        let mut s = quick_session();
        let first = s.tasks().create(NewTask::new("First", 2)).unwrap();
        let second = s.tasks().create(NewTask::new("Second", 2)).unwrap();
        s.select_task(&first.id).unwrap();
        assert!(s.delete_task(&second.id).unwrap().is_empty());
        assert_eq!(s.active_task_id(), Some(first.id.as_str()));
    }

    #[test]
    fn select_task_toggles_and_rejects_unknown_ids() {
        let mut s = session();
        let task = s.tasks().create(NewTask::new("Read", 1)).unwrap();
        s.select_task(&task.id).unwrap();
        assert_eq!(s.active_task_id(), Some(task.id.as_str()));
        s.select_task(&task.id).unwrap();
        assert_eq!(s.active_task_id(), None);
        assert!(matches!(
            s.select_task("missing"),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn toggle_complete_on_active_task_reselects() {
        let mut s = session();
        let first = s.tasks().create(NewTask::new("First", 2)).unwrap();
        let second = s.tasks().create(NewTask::new("Second", 2)).unwrap();
        s.select_task(&first.id).unwrap();

        let events = s.toggle_complete(&first.id).unwrap();
        assert!(matches!(events.first(), Some(Event::TaskCompleted { .. })));
        assert_eq!(s.active_task_id(), Some(second.id.as_str()));
        let done = &s.tasks().list_completed().unwrap()[0];
        assert_eq!(done.completed_pomodoros, done.estimated_pomodoros);
    }

    #[test]
    fn manually_completed_tasks_are_swept_on_foco_completion() {
        let mut s = quick_session();
        let task = s.tasks().create(NewTask::new("Edited", 2)).unwrap();
        s.tasks()
            .update(
                &task.id,
                TaskPatch {
                    completed_pomodoros: Some(2),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert!(s.tasks().get(&task.id).unwrap().is_some());

        finish_interval(&mut s);
        assert!(s.tasks().get(&task.id).unwrap().is_none());
        assert_eq!(s.tasks().list_completed().unwrap().len(), 1);
    }

    #[test]
    fn invalid_durations_keep_previous_values() {
        let mut s = session();
        let err = s
            .update_durations(ModeDurations {
                foco: 7201,
                pausa: 300,
                descanso: 900,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { field: "foco", .. })
        ));
        assert_eq!(s.durations(), ModeDurations::default());
        assert_eq!(s.store().raw(keys::DURATIONS), None);
    }

    #[test]
    fn new_durations_restart_current_mode() {
        let mut s = session();
        s.start();
        let token = s.token().unwrap();
        s.tick(token).unwrap();
        let durations = ModeDurations {
            foco: 3000,
            pausa: 600,
            descanso: 1200,
        };
        let events = s.update_durations(durations).unwrap();
        assert!(matches!(
            events.first(),
            Some(Event::ModeChanged {
                reason: ModeChangeReason::Settings,
                duration_secs: 3000,
                ..
            })
        ));
        assert_eq!(s.remaining_secs(), 3000);
        assert!(!s.is_running());
        assert!(s.tick(token).unwrap().is_empty());

        let reopened = Session::open(s.store).unwrap();
        assert_eq!(reopened.durations(), durations);
    }

    #[test]
    fn settings_form_applies_everything_or_nothing() {
        let mut s = session();
        let mut form = s.settings_form();
        form.pausa_minutes = 10;
        form.long_break_period = 0;
        assert!(s.apply_settings(form).is_err());
        assert_eq!(s.durations().pausa, 300);

        form.long_break_period = 2;
        s.apply_settings(form).unwrap();
        assert_eq!(s.durations().pausa, 600);
        assert_eq!(s.long_break_period(), 2);
        assert_eq!(s.store().raw(keys::DESCANSO_PERIOD).as_deref(), Some("2"));
    }

    #[test]
    fn long_break_period_must_be_positive() {
        let mut s = session();
        assert!(s.update_long_break_period(0).is_err());
        s.update_long_break_period(1).unwrap();
        assert_eq!(s.long_break_period(), 1);
    }

    #[test]
    fn snapshot_renders_clock_and_title() {
        let mut s = session();
        s.change_mode(Mode::Pausa);
        let snapshot = s.snapshot();
        assert_eq!(snapshot.clock(), "05:00");
        assert_eq!(snapshot.title(), "05:00 - Hora de fazer uma pausa");
    }

    #[test]
    fn snapshot_event_is_tagged() {
        let json = serde_json::to_value(Event::StateSnapshot(session().snapshot())).unwrap();
        assert_eq!(json["type"], "StateSnapshot");
        assert_eq!(json["mode"], "foco");
        assert_eq!(json["remaining_secs"], 1500);
    }
}
