//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use
//! internal threads - the host calls `tick()` once per elapsed second
//! while the timer runs, and reports suspension through
//! `enter_background()` / `enter_foreground()` so the countdown can catch
//! up on wall-clock time it did not observe.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Idle        (per phase)
//! Focus -> Break -> Focus -> ...            (phase cycle)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(config, clock, notifier, store);
//! engine.start();
//! // Once per second:
//! if let Some(event) = engine.tick() { /* FocusCompleted / BreakCompleted */ }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::category::{Phase, SessionCategory};
use crate::clock::Clock;
use crate::events::Event;
use crate::notify::{deliver, Notifier, BREAK_TIMER_ID, FOCUS_TIMER_ID};
use crate::storage::{load_json, save_json, KeyValueStore, TimerConfig};

const STATE_KEY: &str = "timer.state";
const AUTO_START_BREAK_KEY: &str = "timer.auto_start_break";
const AUTO_START_FOCUS_KEY: &str = "timer.auto_start_focus";
const CUSTOM_FOCUS_KEY: &str = "timer.custom_focus_minutes";
const CUSTOM_BREAK_KEY: &str = "timer.custom_break_minutes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Idle,
    Running,
    Paused,
}

/// Persistable timer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub phase: Phase,
    pub category: SessionCategory,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub cycles_completed: u32,
    pub auto_start_break: bool,
    pub auto_start_focus: bool,
    /// Instant the host was suspended while the timer ran.
    #[serde(default)]
    pub suspended_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// User-chosen durations for [`SessionCategory::Custom`], in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDurations {
    pub focus_minutes: u32,
    pub break_minutes: u32,
}

/// Focus/break countdown state machine.
pub struct TimerEngine {
    config: TimerConfig,
    state: TimerState,
    custom: CustomDurations,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn KeyValueStore>,
}

impl TimerEngine {
    /// Create a timer engine, restoring persisted preferences and state.
    ///
    /// Without persisted state the timer starts `Idle` on a Pomodoro focus
    /// phase.
    pub fn new(
        config: TimerConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let custom = CustomDurations {
            focus_minutes: load_json(store.as_ref(), CUSTOM_FOCUS_KEY)
                .filter(|m: &u32| *m > 0)
                .unwrap_or(config.custom_focus),
            break_minutes: load_json(store.as_ref(), CUSTOM_BREAK_KEY)
                .filter(|m: &u32| *m > 0)
                .unwrap_or(config.custom_break),
        };
        let auto_start_break =
            load_json(store.as_ref(), AUTO_START_BREAK_KEY).unwrap_or(config.auto_start_break);
        let auto_start_focus =
            load_json(store.as_ref(), AUTO_START_FOCUS_KEY).unwrap_or(config.auto_start_focus);

        let fresh = TimerState {
            mode: TimerMode::Idle,
            phase: Phase::Focus,
            category: SessionCategory::Pomodoro,
            remaining_secs: 0,
            total_secs: 0,
            cycles_completed: 0,
            auto_start_break,
            auto_start_focus,
            suspended_at: None,
        };

        let mut engine = Self {
            config,
            state: fresh,
            custom,
            clock,
            notifier,
            store,
        };

        match load_json::<TimerState>(engine.store.as_ref(), STATE_KEY) {
            Some(mut saved) if saved.total_secs > 0 => {
                saved.remaining_secs = saved.remaining_secs.min(saved.total_secs);
                saved.auto_start_break = auto_start_break;
                saved.auto_start_focus = auto_start_focus;
                engine.state = saved;
            }
            _ => {
                let secs = engine.focus_secs(SessionCategory::Pomodoro);
                engine.state.remaining_secs = secs;
                engine.state.total_secs = secs;
            }
        }
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn category(&self) -> SessionCategory {
        self.state.category
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.state.total_secs
    }

    pub fn cycles_completed(&self) -> u32 {
        self.state.cycles_completed
    }

    pub fn custom_durations(&self) -> CustomDurations {
        self.custom
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        let total = self.state.total_secs;
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.state.remaining_secs as f64 / total as f64)
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted_time(&self) -> String {
        format_mm_ss(self.state.remaining_secs)
    }

    /// Whether a reset would change anything visible.
    pub fn can_reset(&self) -> bool {
        self.state.mode != TimerMode::Idle || self.state.remaining_secs < self.state.total_secs
    }

    /// Minutes a focus phase counts as studied: the full phase length,
    /// including time added with [`add_time`](Self::add_time).
    pub fn minutes_studied(&self) -> u32 {
        u32::try_from(self.state.total_secs / 60).unwrap_or(u32::MAX)
    }

    /// Length of the break that follows the most recent focus cycle.
    pub fn break_minutes(&self) -> u32 {
        let category = self.state.category;
        if category == SessionCategory::Custom {
            return self.custom.break_minutes.max(1);
        }
        let interval = self.config.long_break_interval;
        let cycles = self.state.cycles_completed;
        if category.repeats() && interval > 0 && cycles > 0 && cycles % interval == 0 {
            return self.config.long_break.max(1);
        }
        self.config.break_minutes(category).max(1)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.state.mode,
            phase: self.state.phase,
            category: self.state.category,
            remaining_secs: self.state.remaining_secs,
            total_secs: self.state.total_secs,
            cycles_completed: self.state.cycles_completed,
            progress: self.progress(),
            at: self.clock.now(),
        }
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Select a session category. Only honoured while idle; resets the
    /// phase to focus and the cycle count to zero.
    pub fn set_category(&mut self, category: SessionCategory) -> bool {
        if self.state.mode != TimerMode::Idle {
            return false;
        }
        self.state.category = category;
        self.load_focus_phase();
        self.state.cycles_completed = 0;
        self.state.suspended_at = None;
        self.persist();
        tracing::debug!(%category, "timer category selected");
        true
    }

    /// Save the custom category's durations. Applied immediately when the
    /// custom category is selected and its focus phase has not started.
    pub fn set_custom_durations(&mut self, focus_minutes: u32, break_minutes: u32) {
        self.custom = CustomDurations {
            focus_minutes: focus_minutes.max(1),
            break_minutes: break_minutes.max(1),
        };
        save_json(self.store.as_ref(), CUSTOM_FOCUS_KEY, &self.custom.focus_minutes);
        save_json(self.store.as_ref(), CUSTOM_BREAK_KEY, &self.custom.break_minutes);
        if self.state.category == SessionCategory::Custom
            && self.state.mode == TimerMode::Idle
            && self.state.phase == Phase::Focus
        {
            self.load_focus_phase();
            self.persist();
        }
    }

    pub fn set_auto_start_break(&mut self, enabled: bool) {
        self.state.auto_start_break = enabled;
        save_json(self.store.as_ref(), AUTO_START_BREAK_KEY, &enabled);
        self.persist();
    }

    pub fn set_auto_start_focus(&mut self, enabled: bool) {
        self.state.auto_start_focus = enabled;
        save_json(self.store.as_ref(), AUTO_START_FOCUS_KEY, &enabled);
        self.persist();
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        let resumed = match self.state.mode {
            TimerMode::Running => return None,
            TimerMode::Paused => true,
            TimerMode::Idle => false,
        };
        self.state.mode = TimerMode::Running;
        self.state.suspended_at = None;
        self.schedule_phase_notification();
        self.persist();

        let at = self.clock.now();
        let remaining_secs = self.state.remaining_secs;
        tracing::debug!(phase = ?self.state.phase, remaining_secs, resumed, "timer running");
        Some(if resumed {
            Event::TimerResumed { remaining_secs, at }
        } else {
            Event::TimerStarted {
                phase: self.state.phase,
                category: self.state.category,
                remaining_secs,
                at,
            }
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state.mode != TimerMode::Running {
            return None;
        }
        self.state.mode = TimerMode::Paused;
        self.state.suspended_at = None;
        self.cancel_phase_notifications();
        self.persist();
        Some(Event::TimerPaused {
            remaining_secs: self.state.remaining_secs,
            at: self.clock.now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state.mode != TimerMode::Paused {
            return None;
        }
        self.start()
    }

    /// Return to idle with the current phase's clock restored. A break
    /// stays a break.
    pub fn stop(&mut self) -> Option<Event> {
        if self.state.mode == TimerMode::Idle && self.state.remaining_secs == self.state.total_secs
        {
            return None;
        }
        self.state.mode = TimerMode::Idle;
        self.state.remaining_secs = self.state.total_secs;
        self.state.suspended_at = None;
        self.cancel_phase_notifications();
        self.persist();
        Some(Event::TimerStopped {
            phase: self.state.phase,
            at: self.clock.now(),
        })
    }

    /// Stop, then go back to a fresh focus phase of the current category.
    pub fn reset(&mut self) -> Option<Event> {
        self.state.mode = TimerMode::Idle;
        self.state.suspended_at = None;
        self.state.cycles_completed = 0;
        self.load_focus_phase();
        self.cancel_phase_notifications();
        self.persist();
        Some(Event::TimerReset {
            at: self.clock.now(),
        })
    }

    /// Abandon the current break and return to an idle focus phase.
    pub fn skip_break(&mut self) -> Option<Event> {
        if self.state.phase != Phase::Break {
            return None;
        }
        self.state.mode = TimerMode::Idle;
        self.state.suspended_at = None;
        self.load_focus_phase();
        self.cancel_phase_notifications();
        self.persist();
        Some(Event::BreakSkipped {
            at: self.clock.now(),
        })
    }

    /// Extend the current phase. Valid in any mode.
    pub fn add_time(&mut self, minutes: u32) {
        let secs = u64::from(minutes).saturating_mul(60);
        self.state.remaining_secs = self.state.remaining_secs.saturating_add(secs);
        self.state.total_secs = self.state.total_secs.saturating_add(secs);
        if self.state.mode == TimerMode::Running {
            self.schedule_phase_notification();
        }
        self.persist();
    }

    /// Call once per elapsed second. Returns the completion event when the
    /// phase runs out.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state.mode != TimerMode::Running {
            return None;
        }
        self.state.remaining_secs = self.state.remaining_secs.saturating_sub(1);
        if self.state.remaining_secs == 0 {
            return Some(self.complete_phase());
        }
        None
    }

    /// Record that the host is being suspended while the timer runs.
    pub fn enter_background(&mut self) {
        if self.state.mode != TimerMode::Running {
            return;
        }
        self.state.suspended_at = Some(self.clock.now());
        self.persist();
    }

    /// Catch up on the wall-clock time spent suspended. Completes the
    /// phase (at most one) if it ran out in the meantime.
    pub fn enter_foreground(&mut self) -> Option<Event> {
        let since = self.state.suspended_at.take()?;
        if self.state.mode != TimerMode::Running {
            self.persist();
            return None;
        }
        let gap = (self.clock.now() - since).num_seconds().max(0) as u64;
        tracing::debug!(gap, "catching up after suspension");
        self.state.remaining_secs = self.state.remaining_secs.saturating_sub(gap);
        if self.state.remaining_secs == 0 {
            return Some(self.complete_phase());
        }
        self.persist();
        None
    }

    /// Finish the current phase now and move to the next one.
    pub fn complete_phase(&mut self) -> Event {
        let at = self.clock.now();
        self.cancel_phase_notifications();
        self.state.mode = TimerMode::Idle;
        self.state.suspended_at = None;

        let (event, auto_start) = match self.state.phase {
            Phase::Focus => {
                let minutes = self.minutes_studied();
                self.state.cycles_completed = self.state.cycles_completed.saturating_add(1);
                let break_secs = u64::from(self.break_minutes()) * 60;
                self.state.phase = Phase::Break;
                self.state.remaining_secs = break_secs;
                self.state.total_secs = break_secs;
                tracing::info!(
                    category = %self.state.category,
                    minutes,
                    cycles = self.state.cycles_completed,
                    "focus completed"
                );
                (
                    Event::FocusCompleted {
                        category: self.state.category,
                        minutes,
                        at,
                    },
                    self.state.auto_start_break,
                )
            }
            Phase::Break => {
                self.load_focus_phase();
                tracing::info!("break completed");
                (Event::BreakCompleted { at }, self.state.auto_start_focus)
            }
        };

        if auto_start {
            let _ = self.start();
        } else {
            self.persist();
        }
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn focus_secs(&self, category: SessionCategory) -> u64 {
        let minutes = match category {
            SessionCategory::Custom => self.custom.focus_minutes,
            other => self.config.focus_minutes(other),
        };
        u64::from(minutes.max(1)) * 60
    }

    fn load_focus_phase(&mut self) {
        let secs = self.focus_secs(self.state.category);
        self.state.phase = Phase::Focus;
        self.state.remaining_secs = secs;
        self.state.total_secs = secs;
    }

    fn schedule_phase_notification(&self) {
        let (id, title, body) = match self.state.phase {
            Phase::Focus => (
                FOCUS_TIMER_ID,
                "Focus complete!",
                "Well done! You finished your focus session. Time for a break.",
            ),
            Phase::Break => (
                BREAK_TIMER_ID,
                "Break over!",
                "Your break is over. Ready for another focus session?",
            ),
        };
        deliver(
            id,
            self.notifier
                .schedule_one_shot(id, self.state.remaining_secs, title, body),
        );
    }

    fn cancel_phase_notifications(&self) {
        deliver(FOCUS_TIMER_ID, self.notifier.cancel(FOCUS_TIMER_ID));
        deliver(BREAK_TIMER_ID, self.notifier.cancel(BREAK_TIMER_ID));
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), STATE_KEY, &self.state);
    }
}

/// Format seconds as `MM:SS` (minutes keep counting past 59).
pub fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    struct Fixture {
        clock: Arc<ManualClock>,
        notifier: Arc<RecordingNotifier>,
        store: Arc<MemoryStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                clock: Arc::new(ManualClock::new(
                    Utc.with_ymd_and_hms(2025, 10, 20, 9, 0, 0).unwrap(),
                )),
                notifier: Arc::new(RecordingNotifier::new()),
                store: Arc::new(MemoryStore::new()),
            }
        }

        fn engine(&self, config: TimerConfig) -> TimerEngine {
            TimerEngine::new(
                config,
                self.clock.clone(),
                self.notifier.clone(),
                self.store.clone(),
            )
        }
    }

    fn manual_config() -> TimerConfig {
        TimerConfig {
            auto_start_break: false,
            auto_start_focus: false,
            ..Default::default()
        }
    }

    fn run_to_completion(engine: &mut TimerEngine) -> Event {
        loop {
            if let Some(event) = engine.tick() {
                return event;
            }
        }
    }

    #[test]
    fn start_pause_resume() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        assert_eq!(engine.mode(), TimerMode::Idle);

        assert!(matches!(engine.start(), Some(Event::TimerStarted { .. })));
        assert_eq!(engine.mode(), TimerMode::Running);
        assert!(engine.start().is_none());

        engine.tick();
        assert!(matches!(
            engine.pause(),
            Some(Event::TimerPaused { remaining_secs: 1499, .. })
        ));
        assert_eq!(engine.mode(), TimerMode::Paused);
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 1499);

        assert!(matches!(engine.resume(), Some(Event::TimerResumed { .. })));
        assert_eq!(engine.mode(), TimerMode::Running);
    }

    #[test]
    fn invalid_transitions_are_noops() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        assert!(engine.pause().is_none());
        assert!(engine.resume().is_none());
        assert!(engine.stop().is_none());
        assert!(engine.skip_break().is_none());
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 25 * 60);
    }

    #[test]
    fn pomodoro_focus_runs_into_short_break() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        engine.start();

        let mut completions = Vec::new();
        for _ in 0..1500 {
            if let Some(event) = engine.tick() {
                completions.push(event);
            }
        }

        assert_eq!(completions.len(), 1);
        assert!(matches!(
            completions[0],
            Event::FocusCompleted {
                category: SessionCategory::Pomodoro,
                minutes: 25,
                ..
            }
        ));
        assert_eq!(engine.phase(), Phase::Break);
        assert_eq!(engine.mode(), TimerMode::Idle);
        assert_eq!(engine.total_secs(), 5 * 60);
        assert_eq!(engine.cycles_completed(), 1);
    }

    #[test]
    fn fourth_pomodoro_takes_long_break() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        for cycle in 1..=4 {
            engine.start();
            run_to_completion(&mut engine);
            let expected = if cycle == 4 { 15 } else { 5 };
            assert_eq!(engine.total_secs(), expected * 60, "cycle {cycle}");
            engine.start();
            assert!(matches!(run_to_completion(&mut engine), Event::BreakCompleted { .. }));
            assert_eq!(engine.phase(), Phase::Focus);
        }
    }

    #[test]
    fn deep_work_never_takes_long_break() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        engine.set_category(SessionCategory::DeepWork);
        for _ in 0..4 {
            engine.complete_phase();
            assert_eq!(engine.total_secs(), 20 * 60);
            engine.complete_phase();
        }
        assert_eq!(engine.cycles_completed(), 4);
    }

    #[test]
    fn auto_start_chains_phases() {
        let fx = Fixture::new();
        let mut engine = fx.engine(TimerConfig {
            auto_start_break: true,
            auto_start_focus: true,
            ..Default::default()
        });
        engine.set_category(SessionCategory::ShortFocus);
        engine.start();
        run_to_completion(&mut engine);
        assert_eq!(engine.phase(), Phase::Break);
        assert_eq!(engine.mode(), TimerMode::Running);
        assert!(fx.notifier.is_pending(BREAK_TIMER_ID));

        run_to_completion(&mut engine);
        assert_eq!(engine.phase(), Phase::Focus);
        assert_eq!(engine.mode(), TimerMode::Running);
        assert_eq!(engine.total_secs(), 15 * 60);
    }

    #[test]
    fn pause_cancels_pending_completion_notification() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        engine.start();
        assert_eq!(fx.notifier.pending_delay(FOCUS_TIMER_ID), Some(1500));

        engine.pause();
        assert!(fx.notifier.pending_ids().is_empty());

        engine.resume();
        assert_eq!(fx.notifier.pending_delay(FOCUS_TIMER_ID), Some(1500));
        engine.stop();
        assert!(fx.notifier.pending_ids().is_empty());
    }

    #[test]
    fn stop_keeps_break_phase_reset_returns_to_focus() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        engine.complete_phase();
        engine.start();
        engine.tick();
        assert!(engine.stop().is_some());
        assert_eq!(engine.phase(), Phase::Break);
        assert_eq!(engine.remaining_secs(), engine.total_secs());

        engine.reset();
        assert_eq!(engine.phase(), Phase::Focus);
        assert_eq!(engine.cycles_completed(), 0);
        assert_eq!(engine.total_secs(), 25 * 60);
    }

    #[test]
    fn set_category_only_when_idle() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        engine.start();
        assert!(!engine.set_category(SessionCategory::DeepWork));
        assert_eq!(engine.category(), SessionCategory::Pomodoro);
        engine.pause();
        assert!(!engine.set_category(SessionCategory::DeepWork));
        engine.stop();
        assert!(engine.set_category(SessionCategory::DeepWork));
        assert_eq!(engine.total_secs(), 90 * 60);
    }

    #[test]
    fn custom_durations_persist() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        engine.set_category(SessionCategory::Custom);
        assert_eq!(engine.total_secs(), 30 * 60);
        engine.set_custom_durations(45, 10);
        assert_eq!(engine.total_secs(), 45 * 60);
        engine.complete_phase();
        assert_eq!(engine.total_secs(), 10 * 60);

        let restored = fx.engine(manual_config());
        assert_eq!(
            restored.custom_durations(),
            CustomDurations {
                focus_minutes: 45,
                break_minutes: 10
            }
        );
        assert_eq!(restored.phase(), Phase::Break);
    }

    #[test]
    fn add_time_extends_both_clocks() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        engine.start();
        engine.tick();
        engine.add_time(5);
        assert_eq!(engine.remaining_secs(), 1799);
        assert_eq!(engine.total_secs(), 1800);
        assert_eq!(fx.notifier.pending_delay(FOCUS_TIMER_ID), Some(1799));

        assert!(matches!(
            engine.complete_phase(),
            Event::FocusCompleted { minutes: 30, .. }
        ));
    }

    #[test]
    fn foreground_catches_up_elapsed_time() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        engine.start();
        engine.enter_background();
        fx.clock.advance_secs(600);
        assert!(engine.enter_foreground().is_none());
        assert_eq!(engine.remaining_secs(), 900);

        engine.enter_background();
        fx.clock.advance_secs(10_000);
        let event = engine.enter_foreground();
        assert!(matches!(event, Some(Event::FocusCompleted { minutes: 25, .. })));
        assert_eq!(engine.phase(), Phase::Break);
        assert_eq!(engine.remaining_secs(), 5 * 60);
    }

    #[test]
    fn foreground_without_suspension_is_noop() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        engine.start();
        fx.clock.advance_secs(60);
        assert!(engine.enter_foreground().is_none());
        assert_eq!(engine.remaining_secs(), 1500);

        engine.pause();
        engine.enter_background();
        fx.clock.advance_secs(60);
        assert!(engine.enter_foreground().is_none());
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn state_survives_restart() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        engine.start();
        for _ in 0..100 {
            engine.tick();
        }
        engine.enter_background();

        fx.clock.advance_secs(200);
        let mut restored = fx.engine(manual_config());
        assert_eq!(restored.mode(), TimerMode::Running);
        restored.enter_foreground();
        assert_eq!(restored.remaining_secs(), 1500 - 100 - 200);
    }

    #[test]
    fn progress_and_format() {
        let fx = Fixture::new();
        let mut engine = fx.engine(manual_config());
        assert_eq!(engine.progress(), 0.0);
        assert_eq!(engine.formatted_time(), "25:00");
        assert!(!engine.can_reset());
        engine.start();
        for _ in 0..750 {
            engine.tick();
        }
        assert!((engine.progress() - 0.5).abs() < 1e-9);
        assert_eq!(engine.formatted_time(), "12:30");
        assert!(engine.can_reset());
        assert_eq!(format_mm_ss(90 * 60), "90:00");
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let fx = Fixture::new();
        let engine = fx.engine(manual_config());
        match engine.snapshot() {
            Event::StateSnapshot {
                mode,
                phase,
                remaining_secs,
                ..
            } => {
                assert_eq!(mode, TimerMode::Idle);
                assert_eq!(phase, Phase::Focus);
                assert_eq!(remaining_secs, 25 * 60);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
