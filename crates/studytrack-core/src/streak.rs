//! Consecutive-study-day streaks with freeze protection.
//!
//! A streak counts calendar days up to and including `last_study_day`.
//! Missing a day breaks the streak unless auto-protection is on and a
//! freeze is available, in which case one freeze covers the whole gap.
//! Auto-protection starts disabled.
//!
//! A gap found on foreground without protection zeroes the streak and
//! clears `last_study_day`, so the next study day starts a fresh run at 1
//! instead of being treated as another gap.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::storage::{delete_key, load_json, save_json, KeyValueStore, StreakConfig};

const CURRENT_KEY: &str = "streak.current";
const LONGEST_KEY: &str = "streak.longest";
const FREEZES_KEY: &str = "streak.freezes";
const PROTECTION_KEY: &str = "streak.protection";
const LAST_STUDY_DAY_KEY: &str = "streak.last_study_day";
const LAST_FREEZE_DAY_KEY: &str = "streak.last_freeze_day";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
    pub last_study_day: Option<NaiveDate>,
    pub freezes: u32,
    pub protection: bool,
    pub last_freeze_day: Option<NaiveDate>,
}

/// Result of [`StreakEngine::record_study_day`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakOutcome {
    FirstDay,
    AlreadyRecorded,
    Extended,
    /// A gap was bridged by spending one freeze.
    FreezeApplied,
    /// A gap broke the streak; counting restarts at 1.
    Reset { previous: u32 },
}

impl StreakOutcome {
    /// Whether this call counted a new study day.
    pub fn is_new_day(&self) -> bool {
        !matches!(self, StreakOutcome::AlreadyRecorded)
    }
}

/// Result of [`StreakEngine::check_and_apply_decay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayOutcome {
    Intact,
    FreezeApplied { freezes_left: u32 },
    Broken { previous: u32 },
}

pub struct StreakEngine {
    config: StreakConfig,
    state: StreakState,
    clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
}

impl StreakEngine {
    /// Load the streak from the store. A first run seeds the configured
    /// number of freezes with protection disabled.
    pub fn new(config: StreakConfig, clock: Arc<dyn Clock>, store: Arc<dyn KeyValueStore>) -> Self {
        let s = store.as_ref();
        let current: u32 = load_json(s, CURRENT_KEY).unwrap_or(0);
        let longest: u32 = load_json(s, LONGEST_KEY).unwrap_or(0);
        let state = StreakState {
            current,
            longest: longest.max(current),
            last_study_day: load_json(s, LAST_STUDY_DAY_KEY),
            freezes: load_json(s, FREEZES_KEY).unwrap_or(config.initial_freezes),
            protection: load_json(s, PROTECTION_KEY).unwrap_or(false),
            last_freeze_day: load_json(s, LAST_FREEZE_DAY_KEY),
        };
        Self {
            config,
            state,
            clock,
            store,
        }
    }

    pub fn state(&self) -> &StreakState {
        &self.state
    }

    pub fn current(&self) -> u32 {
        self.state.current
    }

    pub fn longest(&self) -> u32 {
        self.state.longest
    }

    pub fn freezes(&self) -> u32 {
        self.state.freezes
    }

    pub fn protection(&self) -> bool {
        self.state.protection
    }

    pub fn last_study_day(&self) -> Option<NaiveDate> {
        self.state.last_study_day
    }

    /// Whether a freeze was spent today.
    pub fn is_frozen_today(&self) -> bool {
        self.state.last_freeze_day == Some(self.clock.today())
    }

    /// Smallest milestone above the current streak.
    pub fn next_milestone(&self) -> Option<u32> {
        self.config
            .milestones
            .iter()
            .copied()
            .find(|m| *m > self.state.current)
    }

    /// Progress (0.0 ..= 1.0) from the previous milestone to the next one.
    pub fn milestone_progress(&self) -> f64 {
        let Some(next) = self.next_milestone() else {
            return 1.0;
        };
        let previous = self
            .config
            .milestones
            .iter()
            .copied()
            .filter(|m| *m <= self.state.current)
            .max()
            .unwrap_or(0);
        let span = next.saturating_sub(previous);
        if span == 0 {
            return 0.0;
        }
        f64::from(self.state.current - previous) / f64::from(span)
    }

    /// Count `today` as a study day.
    pub fn record_study_day(&mut self, today: NaiveDate) -> StreakOutcome {
        let outcome = match self.state.last_study_day {
            None => {
                self.state.current = 1;
                StreakOutcome::FirstDay
            }
            Some(last) => match (today - last).num_days() {
                // Clock moved backwards; treat as already recorded.
                d if d <= 0 => return StreakOutcome::AlreadyRecorded,
                1 => {
                    self.state.current = self.state.current.saturating_add(1);
                    StreakOutcome::Extended
                }
                _ if self.state.protection && self.state.freezes > 0 => {
                    self.state.freezes -= 1;
                    self.state.last_freeze_day = Some(today);
                    tracing::info!(
                        streak = self.state.current,
                        freezes_left = self.state.freezes,
                        "freeze applied to missed days"
                    );
                    StreakOutcome::FreezeApplied
                }
                _ => {
                    let previous = self.state.current;
                    self.state.current = 1;
                    tracing::info!(previous, "streak reset");
                    StreakOutcome::Reset { previous }
                }
            },
        };
        self.state.last_study_day = Some(today);
        self.state.longest = self.state.longest.max(self.state.current);
        self.persist();
        outcome
    }

    /// Settle missed days when the app comes back to the foreground.
    ///
    /// A protected gap spends one freeze and moves `last_study_day` to
    /// yesterday so studying today extends the streak. An unprotected gap
    /// breaks the streak and clears `last_study_day`.
    pub fn check_and_apply_decay(&mut self, today: NaiveDate) -> DecayOutcome {
        let Some(last) = self.state.last_study_day else {
            return DecayOutcome::Intact;
        };
        if (today - last).num_days() <= 1 {
            return DecayOutcome::Intact;
        }

        if self.state.protection && self.state.freezes > 0 {
            self.state.freezes -= 1;
            self.state.last_freeze_day = Some(today);
            self.state.last_study_day = Some(today - Duration::days(1));
            self.persist();
            tracing::info!(freezes_left = self.state.freezes, "streak protected by freeze");
            return DecayOutcome::FreezeApplied {
                freezes_left: self.state.freezes,
            };
        }

        let previous = self.state.current;
        self.state.current = 0;
        self.state.last_study_day = None;
        self.persist();
        tracing::info!(previous, "streak broken");
        DecayOutcome::Broken { previous }
    }

    /// Spend a freeze by hand. Returns false when none are left.
    pub fn use_freeze(&mut self) -> bool {
        if self.state.freezes == 0 {
            return false;
        }
        self.state.freezes -= 1;
        self.state.last_freeze_day = Some(self.clock.today());
        self.persist();
        true
    }

    pub fn add_freezes(&mut self, count: u32) {
        self.state.freezes = self.state.freezes.saturating_add(count);
        self.persist();
    }

    /// Flip auto-protection and return the new setting.
    pub fn toggle_protection(&mut self) -> bool {
        self.state.protection = !self.state.protection;
        self.persist();
        self.state.protection
    }

    /// Overwrite the current streak (debug and import use). The streak is
    /// taken to end today.
    pub fn set_streak(&mut self, days: u32) {
        self.state.current = days;
        self.state.longest = self.state.longest.max(days);
        self.state.last_study_day = Some(self.clock.today());
        self.persist();
    }

    /// Zero the current streak. Longest and freezes are kept.
    pub fn reset_streak(&mut self) {
        self.state.current = 0;
        self.state.last_study_day = None;
        self.persist();
    }

    /// Forget everything, back to first-run state.
    pub fn reset_all(&mut self) {
        self.state = StreakState {
            current: 0,
            longest: 0,
            last_study_day: None,
            freezes: self.config.initial_freezes,
            protection: false,
            last_freeze_day: None,
        };
        self.persist();
    }

    fn persist(&self) {
        let s = self.store.as_ref();
        save_json(s, CURRENT_KEY, &self.state.current);
        save_json(s, LONGEST_KEY, &self.state.longest);
        save_json(s, FREEZES_KEY, &self.state.freezes);
        save_json(s, PROTECTION_KEY, &self.state.protection);
        match self.state.last_study_day {
            Some(day) => save_json(s, LAST_STUDY_DAY_KEY, &day),
            None => delete_key(s, LAST_STUDY_DAY_KEY),
        }
        match self.state.last_freeze_day {
            Some(day) => save_json(s, LAST_FREEZE_DAY_KEY, &day),
            None => delete_key(s, LAST_FREEZE_DAY_KEY),
        }
    }
}
