//! Daily and weekly challenges with one-shot rewards.
//!
//! Each challenge is tagged with the [`ChallengeCategory`] of activity it
//! counts. Progress only grows; the reward is granted on the update that
//! first reaches the goal and never again.

mod catalog;

pub use catalog::{daily_set, weekly_set};

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::events::Event;
use crate::storage::{load_json, save_json, KeyValueStore};

const BOARD_KEY: &str = "challenges.board";

/// Kind of activity a challenge counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeCategory {
    StudyMinutes,
    TasksCompleted,
    SessionsCompleted,
    DaysStudied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ChallengeReward {
    Xp(u64),
    StreakFreeze,
    Badge(String),
    Theme(String),
}

impl std::fmt::Display for ChallengeReward {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChallengeReward::Xp(n) => write!(f, "{n} XP"),
            ChallengeReward::StreakFreeze => f.write_str("streak freeze"),
            ChallengeReward::Badge(name) => write!(f, "badge \"{name}\""),
            ChallengeReward::Theme(name) => write!(f, "theme \"{name}\""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ChallengeCategory,
    pub cadence: Cadence,
    pub goal: u32,
    /// May run past `goal`; use [`display_progress`](Self::display_progress).
    pub progress: u32,
    pub reward: ChallengeReward,
    pub difficulty: Difficulty,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub reward_claimed: bool,
}

impl Challenge {
    pub fn is_completed(&self) -> bool {
        self.progress >= self.goal
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn display_progress(&self) -> u32 {
        self.progress.min(self.goal)
    }

    /// Fraction complete, clamped to 1. A zero goal reads as 0.
    pub fn fraction(&self) -> f64 {
        if self.goal == 0 {
            return 0.0;
        }
        f64::from(self.display_progress()) / f64::from(self.goal)
    }
}

/// Receiver of rewards that affect other engines.
pub trait RewardSink {
    fn grant_xp(&mut self, amount: u64, reason: &str);
    fn grant_freezes(&mut self, count: u32);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeBoard {
    pub challenges: Vec<Challenge>,
    #[serde(default)]
    pub badges: BTreeSet<String>,
    #[serde(default)]
    pub themes: BTreeSet<String>,
}

pub struct ChallengeEngine {
    board: ChallengeBoard,
    clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
}

impl ChallengeEngine {
    /// Load the board and replace any set that expired while away.
    pub fn new(clock: Arc<dyn Clock>, store: Arc<dyn KeyValueStore>) -> Self {
        let board = load_json(store.as_ref(), BOARD_KEY).unwrap_or_default();
        let mut engine = Self { board, clock, store };
        let now = engine.clock.now();
        engine.refresh(now);
        engine
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.board.challenges
    }

    pub fn by_cadence(&self, cadence: Cadence) -> impl Iterator<Item = &Challenge> {
        self.board
            .challenges
            .iter()
            .filter(move |c| c.cadence == cadence)
    }

    pub fn get(&self, id: Uuid) -> Option<&Challenge> {
        self.board.challenges.iter().find(|c| c.id == id)
    }

    pub fn badges(&self) -> &BTreeSet<String> {
        &self.board.badges
    }

    pub fn themes(&self) -> &BTreeSet<String> {
        &self.board.themes
    }

    pub fn completed_count(&self) -> usize {
        self.board
            .challenges
            .iter()
            .filter(|c| c.is_completed())
            .count()
    }

    /// Regenerate each set that has expired (or is missing). Returns true
    /// when anything changed.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> bool {
        let mut changed = false;
        for cadence in [Cadence::Daily, Cadence::Weekly] {
            let stale = {
                let mut set = self.by_cadence(cadence).peekable();
                set.peek().is_none() || set.any(|c| c.is_expired(now))
            };
            if !stale {
                continue;
            }
            self.board.challenges.retain(|c| c.cadence != cadence);
            let fresh = match cadence {
                Cadence::Daily => daily_set(self.clock.as_ref(), now),
                Cadence::Weekly => weekly_set(now),
            };
            tracing::debug!(?cadence, "challenge set regenerated");
            self.board.challenges.extend(fresh);
            changed = true;
        }
        if changed {
            self.persist();
        }
        changed
    }

    /// Add `amount` to every unexpired challenge of `category`, completed
    /// ones included. A reward is granted through `sink` only on the update
    /// that first reaches the goal.
    pub fn update_progress(
        &mut self,
        category: ChallengeCategory,
        amount: u32,
        sink: &mut dyn RewardSink,
    ) -> Vec<Event> {
        if amount == 0 {
            return Vec::new();
        }
        let now = self.clock.now();
        let mut won = Vec::new();
        for challenge in self.board.challenges.iter_mut() {
            if challenge.category != category || challenge.is_expired(now) {
                continue;
            }
            challenge.progress = challenge.progress.saturating_add(amount);
            if challenge.is_completed() && !challenge.reward_claimed {
                challenge.reward_claimed = true;
                won.push((challenge.id, challenge.title.clone(), challenge.reward.clone()));
            }
        }

        let mut events = Vec::with_capacity(won.len());
        for (id, title, reward) in won {
            tracing::info!(%id, %title, %reward, "challenge completed");
            self.claim_reward(&reward, sink);
            events.push(Event::ChallengeCompleted {
                id,
                title,
                reward,
                at: now,
            });
        }
        self.persist();
        events
    }

    /// Grant a reward. Cosmetic rewards are recorded as owned.
    pub fn claim_reward(&mut self, reward: &ChallengeReward, sink: &mut dyn RewardSink) {
        match reward {
            ChallengeReward::Xp(amount) => sink.grant_xp(*amount, "Challenge completed"),
            ChallengeReward::StreakFreeze => sink.grant_freezes(1),
            ChallengeReward::Badge(name) => {
                self.board.badges.insert(name.clone());
                self.persist();
            }
            ChallengeReward::Theme(name) => {
                self.board.themes.insert(name.clone());
                self.persist();
            }
        }
    }

    /// Throw away all progress and owned cosmetics.
    pub fn reset(&mut self) {
        self.board = ChallengeBoard::default();
        let now = self.clock.now();
        self.refresh(now);
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), BOARD_KEY, &self.board);
    }
}
