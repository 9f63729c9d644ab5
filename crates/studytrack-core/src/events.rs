use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::challenges::ChallengeReward;
use crate::level::LevelTitle;
use crate::timer::{Phase, SessionCategory, TimerMode};

/// Every state change the UI may care about produces an Event.
/// The UI drains them from the tracker; the core never reads UI state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        category: SessionCategory,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        phase: Phase,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    FocusCompleted {
        category: SessionCategory,
        minutes: u32,
        at: DateTime<Utc>,
    },
    BreakCompleted {
        at: DateTime<Utc>,
    },
    BreakSkipped {
        at: DateTime<Utc>,
    },
    /// A study session was logged by hand rather than by the timer.
    SessionLogged {
        category: String,
        minutes: u32,
        at: DateTime<Utc>,
    },
    XpGained {
        amount: u64,
        reason: String,
        at: DateTime<Utc>,
    },
    LevelUp {
        new_level: u32,
        title: LevelTitle,
        at: DateTime<Utc>,
    },
    ChallengeCompleted {
        id: Uuid,
        title: String,
        reward: ChallengeReward,
        at: DateTime<Utc>,
    },
    FreezeAutoApplied {
        streak: u32,
        freezes_left: u32,
        at: DateTime<Utc>,
    },
    StreakBroken {
        previous: u32,
        at: DateTime<Utc>,
    },
    DailyGoalReached {
        goal_hours: f64,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        id: Uuid,
        title: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        phase: Phase,
        category: SessionCategory,
        remaining_secs: u64,
        total_secs: u64,
        cycles_completed: u32,
        progress: f64,
        at: DateTime<Utc>,
    },
}
