//! # StudyTrack Core Library
//!
//! This library provides the rules behind the StudyTrack study tracker:
//! the focus timer, streaks, XP levels, challenges and the session history
//! they feed on. All operations are available through the standalone
//! `studytrack` CLI binary; any other front end is a thin layer over the
//! same [`StudyTracker`].
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven focus/break state machine; the caller
//!   invokes `tick()` once per second and reports suspension explicitly
//! - **Engines**: streak, level, challenge, history and task state holders,
//!   each persisting its own keys
//! - **Coordinator**: [`StudyTracker`] fans a finished session out to every
//!   engine in a fixed order and queues [`Event`]s for the UI to poll
//! - **Collaborators**: [`Clock`], [`KeyValueStore`] and [`Notifier`] are
//!   injected, so tests run on manual time and in-memory storage
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: focus/break countdown
//! - [`StreakEngine`]: consecutive study days with freezes
//! - [`LevelEngine`]: XP and level-ups
//! - [`ChallengeEngine`]: daily and weekly goals with one-shot rewards
//! - [`Config`]: application configuration

pub mod challenges;
pub mod clock;
pub mod error;
pub mod events;
pub mod history;
pub mod level;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod tasks;
pub mod timer;
pub mod tracker;

pub use challenges::{Challenge, ChallengeCategory, ChallengeEngine, ChallengeReward, RewardSink};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, NotifyError, StoreError, ValidationError};
pub use events::Event;
pub use history::{SessionHistory, StudySession};
pub use level::{calculate_xp, threshold_for, LevelEngine, LevelTitle, StudyActivity};
pub use notify::{LogNotifier, Notifier, NullNotifier, RecordingNotifier};
pub use stats::{Stats, TimeRange};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore};
pub use streak::{DecayOutcome, StreakEngine, StreakOutcome};
pub use tasks::{StudyTask, TaskList, TaskPriority};
pub use timer::{Phase, SessionCategory, TimerEngine, TimerMode, TimerState};
pub use tracker::StudyTracker;
