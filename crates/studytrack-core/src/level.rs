//! XP and level progression.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::events::Event;
use crate::notify::{celebrate, Notifier};
use crate::storage::{load_json, save_json, KeyValueStore, LevelConfig};

const XP_KEY: &str = "level.xp";
const LEVEL_KEY: &str = "level.level";

/// XP needed to advance from `level` to `level + 1`.
pub const fn threshold_for(level: u32) -> u64 {
    let level = level as u64;
    level * 100 + level.saturating_sub(1) * 50
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelTitle {
    Beginner,
    Student,
    Dedicated,
    Expert,
    Master,
    Sage,
    Legend,
}

impl LevelTitle {
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=5 => LevelTitle::Beginner,
            6..=10 => LevelTitle::Student,
            11..=20 => LevelTitle::Dedicated,
            21..=30 => LevelTitle::Expert,
            31..=50 => LevelTitle::Master,
            51..=100 => LevelTitle::Sage,
            _ => LevelTitle::Legend,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelTitle::Beginner => "Beginner",
            LevelTitle::Student => "Student",
            LevelTitle::Dedicated => "Dedicated",
            LevelTitle::Expert => "Expert",
            LevelTitle::Master => "Master",
            LevelTitle::Sage => "Sage",
            LevelTitle::Legend => "Legend",
        }
    }
}

impl fmt::Display for LevelTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that earns XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StudyActivity {
    Session { minutes: u32 },
    TaskCompleted,
    DailyGoalReached,
    StreakDay { day: u32 },
    PerfectWeek,
    ChallengeCompleted,
}

/// XP awarded for an activity.
pub fn calculate_xp(activity: StudyActivity) -> u64 {
    match activity {
        StudyActivity::Session { minutes } => u64::from(minutes) * 2,
        StudyActivity::TaskCompleted => 50,
        StudyActivity::DailyGoalReached => 100,
        StudyActivity::StreakDay { day } => u64::from(day) * 10,
        StudyActivity::PerfectWeek => 500,
        StudyActivity::ChallengeCompleted => 200,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    pub level: u32,
    /// Always below `threshold_for(level)`.
    pub xp: u64,
}

impl LevelState {
    pub fn title(&self) -> LevelTitle {
        LevelTitle::for_level(self.level)
    }

    pub fn xp_to_next(&self) -> u64 {
        threshold_for(self.level).saturating_sub(self.xp)
    }

    pub fn progress(&self) -> f64 {
        let threshold = threshold_for(self.level);
        if threshold == 0 {
            return 0.0;
        }
        self.xp as f64 / threshold as f64
    }

    /// Apply pending level-ups; returns the levels reached, in order.
    fn cascade(&mut self) -> Vec<u32> {
        let mut reached = Vec::new();
        self.level = self.level.max(1);
        while self.xp >= threshold_for(self.level) {
            self.xp -= threshold_for(self.level);
            self.level = self.level.saturating_add(1);
            reached.push(self.level);
        }
        reached
    }
}

pub struct LevelEngine {
    state: LevelState,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn KeyValueStore>,
}

impl LevelEngine {
    pub fn new(
        config: LevelConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let state = LevelState {
            level: load_json(store.as_ref(), LEVEL_KEY).unwrap_or(config.starting_level),
            xp: load_json(store.as_ref(), XP_KEY).unwrap_or(config.starting_xp),
        };
        Self::with_state(state, clock, notifier, store)
    }

    /// Engine starting from an explicit level and XP. A state that already
    /// holds enough XP is levelled up silently.
    pub fn with_state(
        mut state: LevelState,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let normalized = !state.cascade().is_empty();
        let engine = Self {
            state,
            clock,
            notifier,
            store,
        };
        if normalized {
            tracing::debug!(level = engine.state.level, "normalized stored level");
            engine.persist();
        }
        engine
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn xp(&self) -> u64 {
        self.state.xp
    }

    pub fn title(&self) -> LevelTitle {
        self.state.title()
    }

    /// Award XP. Returns the `XpGained` event followed by one `LevelUp`
    /// per level reached.
    pub fn add_xp(&mut self, amount: u64, reason: &str) -> Vec<Event> {
        if amount == 0 {
            return Vec::new();
        }
        let at = self.clock.now();
        self.state.xp = self.state.xp.saturating_add(amount);
        let reached = self.state.cascade();
        self.persist();

        let mut events = vec![Event::XpGained {
            amount,
            reason: reason.to_string(),
            at,
        }];
        for new_level in reached {
            let title = LevelTitle::for_level(new_level);
            tracing::info!(new_level, %title, "level up");
            celebrate(
                self.notifier.as_ref(),
                &format!("You reached level {new_level}: {title}!"),
            );
            events.push(Event::LevelUp {
                new_level,
                title,
                at,
            });
        }
        events
    }

    /// [`add_xp`](Self::add_xp), also telling the user about the award.
    pub fn add_xp_announced(&mut self, amount: u64, reason: &str) -> Vec<Event> {
        let events = self.add_xp(amount, reason);
        if !events.is_empty() {
            celebrate(self.notifier.as_ref(), &format!("+{amount} XP: {reason}"));
        }
        events
    }

    pub fn reset(&mut self, config: &LevelConfig) {
        self.state = LevelState {
            level: config.starting_level,
            xp: config.starting_xp,
        };
        self.state.cascade();
        self.persist();
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), LEVEL_KEY, &self.state.level);
        save_json(self.store.as_ref(), XP_KEY, &self.state.xp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStore;
    use chrono::Utc;

    fn engine_at(level: u32, xp: u64) -> (LevelEngine, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let engine = LevelEngine::with_state(
            LevelState { level, xp },
            Arc::new(ManualClock::new(Utc::now())),
            notifier.clone(),
            Arc::new(MemoryStore::new()),
        );
        (engine, notifier)
    }

    #[test]
    fn thresholds() {
        assert_eq!(threshold_for(1), 100);
        assert_eq!(threshold_for(2), 250);
        assert_eq!(threshold_for(26), 3850);
        assert_eq!(threshold_for(27), 4000);
    }

    #[test]
    fn titles_by_band() {
        assert_eq!(LevelTitle::for_level(1), LevelTitle::Beginner);
        assert_eq!(LevelTitle::for_level(6), LevelTitle::Student);
        assert_eq!(LevelTitle::for_level(20), LevelTitle::Dedicated);
        assert_eq!(LevelTitle::for_level(21), LevelTitle::Expert);
        assert_eq!(LevelTitle::for_level(50), LevelTitle::Master);
        assert_eq!(LevelTitle::for_level(100), LevelTitle::Sage);
        assert_eq!(LevelTitle::for_level(101), LevelTitle::Legend);
    }

    #[test]
    fn cascade_two_levels_from_empty_bar() {
        let (mut engine, notifier) = engine_at(26, 0);
        let events = engine.add_xp(threshold_for(26) + threshold_for(27) + 10, "marathon");
        assert_eq!(engine.level(), 28);
        assert_eq!(engine.xp(), 10);
        let ups: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::LevelUp { new_level, .. } => Some(*new_level),
                _ => None,
            })
            .collect();
        assert_eq!(ups, vec![27, 28]);
        assert_eq!(notifier.immediate_bodies().len(), 2);
    }

    #[test]
    fn cascade_keeps_existing_xp() {
        let (mut engine, _) = engine_at(26, 2500);
        engine.add_xp(threshold_for(26) + threshold_for(27) + 10, "marathon");
        assert_eq!(engine.level(), 28);
        assert_eq!(engine.xp(), 2510);
        assert!(engine.xp() < threshold_for(engine.level()));
    }

    #[test]
    fn silent_award_unless_announced() {
        let (mut engine, notifier) = engine_at(1, 0);
        let events = engine.add_xp(10, "session");
        assert_eq!(events.len(), 1);
        assert!(notifier.immediate_bodies().is_empty());

        engine.add_xp_announced(10, "task");
        assert_eq!(notifier.immediate_bodies(), vec!["+10 XP: task".to_string()]);
        assert!(engine.add_xp(0, "nothing").is_empty());
    }

    #[test]
    fn overfull_state_is_normalized() {
        let (engine, notifier) = engine_at(1, 360);
        assert_eq!(engine.level(), 3);
        assert_eq!(engine.xp(), 10);
        assert!(notifier.calls().is_empty());
    }

    #[test]
    fn xp_formula() {
        assert_eq!(calculate_xp(StudyActivity::Session { minutes: 25 }), 50);
        assert_eq!(calculate_xp(StudyActivity::TaskCompleted), 50);
        assert_eq!(calculate_xp(StudyActivity::DailyGoalReached), 100);
        assert_eq!(calculate_xp(StudyActivity::StreakDay { day: 7 }), 70);
        assert_eq!(calculate_xp(StudyActivity::PerfectWeek), 500);
        assert_eq!(calculate_xp(StudyActivity::ChallengeCompleted), 200);
    }
}
