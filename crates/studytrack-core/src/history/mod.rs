//! Record of completed study sessions.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::ValidationError;
use crate::storage::{load_json, save_json, GoalsConfig, KeyValueStore};

const SESSIONS_KEY: &str = "history.sessions";
const DAILY_GOAL_KEY: &str = "history.daily_goal_hours";

/// One finished block of study. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: Uuid,
    pub duration_secs: u64,
    /// Free-form tag, usually the timer category label.
    pub category: String,
    pub occurred_at: DateTime<Utc>,
}

impl StudySession {
    pub fn minutes(&self) -> u32 {
        u32::try_from(self.duration_secs / 60).unwrap_or(u32::MAX)
    }

    pub fn hours(&self) -> f64 {
        self.duration_secs as f64 / 3600.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub count: u32,
    pub seconds: u64,
}

pub struct SessionHistory {
    sessions: Vec<StudySession>,
    daily_goal_hours: f64,
    clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
}

impl SessionHistory {
    pub fn new(config: GoalsConfig, clock: Arc<dyn Clock>, store: Arc<dyn KeyValueStore>) -> Self {
        let sessions = load_json(store.as_ref(), SESSIONS_KEY).unwrap_or_default();
        let daily_goal_hours = load_json::<f64>(store.as_ref(), DAILY_GOAL_KEY)
            .filter(|h| h.is_finite() && *h >= 0.0)
            .unwrap_or(config.daily_goal_hours);
        Self {
            sessions,
            daily_goal_hours,
            clock,
            store,
        }
    }

    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Record a session that just finished. Zero-length sessions are
    /// ignored.
    pub fn append(&mut self, minutes: u32, category: &str) -> Option<StudySession> {
        let at = self.clock.now();
        self.append_at(minutes, category, at)
    }

    /// Record a session at an explicit instant (manual logging).
    pub fn append_at(
        &mut self,
        minutes: u32,
        category: &str,
        occurred_at: DateTime<Utc>,
    ) -> Option<StudySession> {
        if minutes == 0 {
            return None;
        }
        let session = StudySession {
            id: Uuid::new_v4(),
            duration_secs: u64::from(minutes) * 60,
            category: category.to_string(),
            occurred_at,
        };
        tracing::debug!(minutes, category, "session recorded");
        self.sessions.push(session.clone());
        self.persist();
        Some(session)
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
        self.persist();
    }

    pub fn total_seconds(&self) -> u64 {
        self.sessions.iter().map(|s| s.duration_secs).sum()
    }

    pub fn total_hours(&self) -> f64 {
        self.total_seconds() as f64 / 3600.0
    }

    pub fn seconds_on(&self, day: NaiveDate) -> u64 {
        self.sessions
            .iter()
            .filter(|s| self.clock.day_of(s.occurred_at) == day)
            .map(|s| s.duration_secs)
            .sum()
    }

    pub fn hours_on(&self, day: NaiveDate) -> f64 {
        self.seconds_on(day) as f64 / 3600.0
    }

    pub fn today_seconds(&self) -> u64 {
        self.seconds_on(self.clock.today())
    }

    pub fn today_hours(&self) -> f64 {
        self.today_seconds() as f64 / 3600.0
    }

    pub fn by_category(&self) -> BTreeMap<String, CategoryTotal> {
        let mut totals: BTreeMap<String, CategoryTotal> = BTreeMap::new();
        for session in &self.sessions {
            let entry = totals.entry(session.category.clone()).or_default();
            entry.count = entry.count.saturating_add(1);
            entry.seconds = entry.seconds.saturating_add(session.duration_secs);
        }
        totals
    }

    pub fn daily_goal_hours(&self) -> f64 {
        self.daily_goal_hours
    }

    pub fn daily_goal_secs(&self) -> u64 {
        (self.daily_goal_hours * 3600.0).round() as u64
    }

    pub fn set_daily_goal_hours(&mut self, hours: f64) -> Result<(), ValidationError> {
        if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
            return Err(ValidationError::InvalidValue {
                field: "daily_goal_hours".to_string(),
                message: format!("{hours} is not between 0 and 24"),
            });
        }
        self.daily_goal_hours = hours;
        save_json(self.store.as_ref(), DAILY_GOAL_KEY, &hours);
        Ok(())
    }

    /// Today's share of the daily goal, clamped to 1. A zero goal reads
    /// as 0.
    pub fn daily_goal_progress(&self) -> f64 {
        let goal = self.daily_goal_secs();
        if goal == 0 {
            return 0.0;
        }
        (self.today_seconds() as f64 / goal as f64).min(1.0)
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), SESSIONS_KEY, &self.sessions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    fn history() -> (SessionHistory, Arc<ManualClock>, Arc<MemoryStore>) {
        let day = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
        let clock = Arc::new(ManualClock::on_day(day, 10, 0));
        let store = Arc::new(MemoryStore::new());
        let history = SessionHistory::new(GoalsConfig::default(), clock.clone(), store.clone());
        (history, clock, store)
    }

    #[test]
    fn totals_and_categories() {
        let (mut history, clock, _) = history();
        history.append(25, "Pomodoro");
        history.append(25, "Pomodoro");
        clock.advance_days(-1);
        history.append(90, "Deep Work");
        clock.advance_days(1);

        assert_eq!(history.total_seconds(), 140 * 60);
        assert_eq!(history.today_seconds(), 50 * 60);
        let by_category = history.by_category();
        assert_eq!(by_category["Pomodoro"], CategoryTotal { count: 2, seconds: 3000 });
        assert_eq!(by_category["Deep Work"].count, 1);
        assert!(history.append(0, "Pomodoro").is_none());
    }

    #[test]
    fn goal_progress_guards_zero() {
        let (mut history, _, _) = history();
        history.append(150, "Deep Work");
        assert!((history.daily_goal_progress() - 0.5).abs() < 1e-9);
        history.set_daily_goal_hours(0.0).unwrap();
        assert_eq!(history.daily_goal_progress(), 0.0);
        assert!(history.set_daily_goal_hours(-1.0).is_err());
        assert!(history.set_daily_goal_hours(f64::NAN).is_err());
    }

    #[test]
    fn sessions_and_goal_persist() {
        let (mut history, clock, store) = history();
        history.append(30, "Custom");
        history.set_daily_goal_hours(3.5).unwrap();
        let restored = SessionHistory::new(GoalsConfig::default(), clock, store);
        assert_eq!(restored.sessions(), history.sessions());
        assert_eq!(restored.daily_goal_hours(), 3.5);
    }

    #[test]
    fn clear_removes_everything() {
        let (mut history, _, _) = history();
        history.append(30, "Custom");
        history.clear();
        assert!(history.sessions().is_empty());
        assert_eq!(history.total_hours(), 0.0);
    }
}
