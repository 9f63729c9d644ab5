//! Study tracker coordinator.
//!
//! Owns every engine and applies the consequences of a finished study
//! session in a fixed order:
//!
//! ```text
//! history.append
//!   -> streak.record_study_day   (+1 DaysStudied on a new day)
//!   -> level.add_xp              (+ daily goal bonus, once)
//!   -> challenges.update_progress (SessionsCompleted, StudyMinutes)
//!   -> notifier                  (celebration, streak reminder)
//! ```
//!
//! Every mutation is a `&mut self` call, so one fan-out always finishes
//! before the next begins. The UI polls [`StudyTracker::drain_events`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::challenges::{ChallengeCategory, ChallengeEngine, RewardSink};
use crate::clock::Clock;
use crate::error::ValidationError;
use crate::events::Event;
use crate::history::SessionHistory;
use crate::level::{calculate_xp, LevelEngine, StudyActivity};
use crate::notify::reminders::{refresh_streak_protection, schedule_daily_reminders};
use crate::notify::{celebrate, deliver, Notifier};
use crate::storage::{Config, KeyValueStore};
use crate::streak::{DecayOutcome, StreakEngine, StreakOutcome};
use crate::tasks::{TaskList, Toggled};
use crate::timer::{SessionCategory, TimerEngine};

/// Grants challenge rewards into the level and streak engines.
struct Rewards<'a> {
    level: &'a mut LevelEngine,
    streak: &'a mut StreakEngine,
    events: &'a mut Vec<Event>,
}

impl RewardSink for Rewards<'_> {
    fn grant_xp(&mut self, amount: u64, reason: &str) {
        self.events.extend(self.level.add_xp(amount, reason));
    }

    fn grant_freezes(&mut self, count: u32) {
        self.streak.add_freezes(count);
    }
}

pub struct StudyTracker {
    config: Config,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    history: SessionHistory,
    timer: TimerEngine,
    streak: StreakEngine,
    level: LevelEngine,
    challenges: ChallengeEngine,
    tasks: TaskList,
    outbox: Vec<Event>,
}

impl StudyTracker {
    /// Build every engine from `store`, sharing the same clock and notifier.
    pub fn new(
        config: Config,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let history = SessionHistory::new(config.goals.clone(), clock.clone(), store.clone());
        let timer = TimerEngine::new(
            config.timer.clone(),
            clock.clone(),
            notifier.clone(),
            store.clone(),
        );
        let streak = StreakEngine::new(config.streak.clone(), clock.clone(), store.clone());
        let level = LevelEngine::new(
            config.level.clone(),
            clock.clone(),
            notifier.clone(),
            store.clone(),
        );
        let challenges = ChallengeEngine::new(clock.clone(), store.clone());
        let tasks = TaskList::new(clock.clone(), store);

        Self {
            config,
            clock,
            notifier,
            history,
            timer,
            streak,
            level,
            challenges,
            tasks,
            outbox: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn streak(&self) -> &StreakEngine {
        &self.streak
    }

    pub fn level(&self) -> &LevelEngine {
        &self.level
    }

    pub fn challenges(&self) -> &ChallengeEngine {
        &self.challenges
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    /// Timer settings that do not produce events (custom durations,
    /// auto-start flags).
    pub fn timer_mut(&mut self) -> &mut TimerEngine {
        &mut self.timer
    }

    pub fn streak_mut(&mut self) -> &mut StreakEngine {
        &mut self.streak
    }

    pub fn history_mut(&mut self) -> &mut SessionHistory {
        &mut self.history
    }

    /// Task editing. Completion goes through [`toggle_task`](Self::toggle_task)
    /// so it is rewarded.
    pub fn tasks_mut(&mut self) -> &mut TaskList {
        &mut self.tasks
    }

    /// Take every event produced since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    pub fn snapshot(&self) -> Event {
        self.timer.snapshot()
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn set_category(&mut self, category: SessionCategory) -> bool {
        self.timer.set_category(category)
    }

    pub fn start(&mut self) {
        let event = self.timer.start();
        self.push(event);
    }

    pub fn pause(&mut self) {
        let event = self.timer.pause();
        self.push(event);
    }

    pub fn resume(&mut self) {
        let event = self.timer.resume();
        self.push(event);
    }

    pub fn stop(&mut self) {
        let event = self.timer.stop();
        self.push(event);
    }

    pub fn reset(&mut self) {
        let event = self.timer.reset();
        self.push(event);
    }

    pub fn skip_break(&mut self) {
        let event = self.timer.skip_break();
        self.push(event);
    }

    pub fn add_time(&mut self, minutes: u32) {
        self.timer.add_time(minutes);
    }

    /// Call once per elapsed second.
    pub fn tick(&mut self) {
        if let Some(event) = self.timer.tick() {
            self.on_timer_event(event);
        }
    }

    /// Finish the current phase immediately.
    pub fn complete_phase(&mut self) {
        let event = self.timer.complete_phase();
        self.on_timer_event(event);
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    pub fn enter_background(&mut self) {
        self.timer.enter_background();
    }

    /// Catch up after suspension: timer, streak decay, challenge expiry.
    pub fn on_foreground(&mut self) {
        if let Some(event) = self.timer.enter_foreground() {
            self.on_timer_event(event);
        }

        let at = self.clock.now();
        match self.streak.check_and_apply_decay(self.clock.day_of(at)) {
            DecayOutcome::Intact => {}
            DecayOutcome::FreezeApplied { freezes_left } => {
                self.outbox.push(Event::FreezeAutoApplied {
                    streak: self.streak.current(),
                    freezes_left,
                    at,
                });
            }
            DecayOutcome::Broken { previous } => {
                if previous > 0 {
                    self.outbox.push(Event::StreakBroken { previous, at });
                }
                self.refresh_streak_reminder();
            }
        }

        self.challenges.refresh(at);
    }

    /// Install the recurring daily reminders.
    pub fn schedule_reminders(&self) {
        schedule_daily_reminders(
            self.notifier.as_ref(),
            &self.config.notifications,
            self.streak.current(),
        );
    }

    // ── Study activity ───────────────────────────────────────────────

    /// Record study done outside the timer. Rewarded like a focus phase.
    pub fn log_manual_session(&mut self, minutes: u32, category: &str) {
        if minutes == 0 {
            return;
        }
        let at = self.clock.now();
        self.outbox.push(Event::SessionLogged {
            category: category.to_string(),
            minutes,
            at,
        });
        self.record_study(minutes, category, at);
    }

    /// Flip a task's completion. Only the first completion of a task is
    /// rewarded; reopening it takes nothing back.
    pub fn toggle_task(&mut self, id: Uuid) -> Result<Toggled, ValidationError> {
        let toggled = self.tasks.toggle(id)?;
        if toggled == Toggled::Completed && self.tasks.claim_reward(id)? {
            self.reward_task(id);
        }
        Ok(toggled)
    }

    /// Mark a task completed. Returns false if it already was.
    pub fn complete_task(&mut self, id: Uuid) -> Result<bool, ValidationError> {
        let task = self.tasks.get(id).ok_or(ValidationError::UnknownTask(id))?;
        if task.completed {
            return Ok(false);
        }
        self.toggle_task(id)?;
        Ok(true)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn push(&mut self, event: Option<Event>) {
        self.outbox.extend(event);
    }

    fn on_timer_event(&mut self, event: Event) {
        match event {
            Event::FocusCompleted {
                category,
                minutes,
                at,
            } => {
                self.outbox.push(event);
                self.record_study(minutes, category.label(), at);
            }
            Event::BreakCompleted { .. } => {
                self.outbox.push(event);
                deliver(
                    "break_completed",
                    self.notifier
                        .send_immediate("Break over!", "Ready for another focus session?"),
                );
            }
            other => self.outbox.push(other),
        }
    }

    fn record_study(&mut self, minutes: u32, category: &str, at: DateTime<Utc>) {
        let goal_secs = self.history.daily_goal_secs();
        let before = self.history.today_seconds();
        if self.history.append_at(minutes, category, at).is_none() {
            return;
        }
        let after = self.history.today_seconds();

        let outcome = self.streak.record_study_day(self.clock.day_of(at));
        match outcome {
            StreakOutcome::FreezeApplied => self.outbox.push(Event::FreezeAutoApplied {
                streak: self.streak.current(),
                freezes_left: self.streak.freezes(),
                at,
            }),
            StreakOutcome::Reset { previous } if previous > 0 => {
                self.outbox.push(Event::StreakBroken { previous, at })
            }
            _ => {}
        }
        if outcome.is_new_day() {
            self.advance_challenges(ChallengeCategory::DaysStudied, 1);
        }

        let xp = calculate_xp(StudyActivity::Session { minutes });
        let events = self.level.add_xp(xp, "Study session");
        self.outbox.extend(events);
        if goal_secs > 0 && before < goal_secs && after >= goal_secs {
            self.outbox.push(Event::DailyGoalReached {
                goal_hours: self.history.daily_goal_hours(),
                at,
            });
            let events = self
                .level
                .add_xp_announced(calculate_xp(StudyActivity::DailyGoalReached), "Daily goal reached");
            self.outbox.extend(events);
        }

        self.advance_challenges(ChallengeCategory::SessionsCompleted, 1);
        self.advance_challenges(ChallengeCategory::StudyMinutes, minutes);

        celebrate(
            self.notifier.as_ref(),
            &format!("You studied for {minutes} minutes. Keep it up!"),
        );
        self.refresh_streak_reminder();
    }

    fn reward_task(&mut self, id: Uuid) {
        let at = self.clock.now();
        let title = self
            .tasks
            .get(id)
            .map(|t| t.title.clone())
            .unwrap_or_default();
        tracing::info!(%id, %title, "task completed");
        self.outbox.push(Event::TaskCompleted { id, title, at });
        let events = self
            .level
            .add_xp(calculate_xp(StudyActivity::TaskCompleted), "Task completed");
        self.outbox.extend(events);
        self.advance_challenges(ChallengeCategory::TasksCompleted, 1);
    }

    fn advance_challenges(&mut self, category: ChallengeCategory, amount: u32) {
        // The host may keep running across midnight without a foreground.
        self.challenges.refresh(self.clock.now());
        let mut reward_events = Vec::new();
        let mut sink = Rewards {
            level: &mut self.level,
            streak: &mut self.streak,
            events: &mut reward_events,
        };
        let completed = self.challenges.update_progress(category, amount, &mut sink);
        self.outbox.extend(completed);
        self.outbox.extend(reward_events);
    }

    fn refresh_streak_reminder(&self) {
        refresh_streak_protection(
            self.notifier.as_ref(),
            &self.config.notifications,
            self.streak.current(),
        );
    }
}
