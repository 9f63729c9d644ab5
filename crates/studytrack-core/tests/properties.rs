//! Property tests for the rules engines.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use studytrack_core::challenges::{ChallengeCategory, ChallengeEngine, RewardSink};
use studytrack_core::level::LevelState;
use studytrack_core::notify::{NullNotifier, RecordingNotifier, FOCUS_TIMER_ID};
use studytrack_core::storage::{StreakConfig, TimerConfig};
use studytrack_core::streak::StreakOutcome;
use studytrack_core::{
    threshold_for, LevelEngine, ManualClock, MemoryStore, StreakEngine, TimerEngine,
};

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn level_engine() -> LevelEngine {
    LevelEngine::with_state(
        LevelState { level: 1, xp: 0 },
        Arc::new(ManualClock::new(Utc::now())),
        Arc::new(NullNotifier),
        Arc::new(MemoryStore::new()),
    )
}

fn streak_engine(protection: bool, freezes: u32) -> StreakEngine {
    let mut streak = StreakEngine::new(
        StreakConfig {
            initial_freezes: freezes,
            ..Default::default()
        },
        Arc::new(ManualClock::on_day(base_day(), 9, 0)),
        Arc::new(MemoryStore::new()),
    );
    if protection {
        streak.toggle_protection();
    }
    streak
}

#[derive(Default)]
struct Tally {
    xp_grants: u32,
    freeze_grants: u32,
}

impl RewardSink for Tally {
    fn grant_xp(&mut self, _amount: u64, _reason: &str) {
        self.xp_grants += 1;
    }

    fn grant_freezes(&mut self, count: u32) {
        self.freeze_grants += count;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn thresholds_strictly_increase(level in 1u32..10_000) {
        prop_assert!(threshold_for(level + 1) > threshold_for(level));
    }

    #[test]
    fn xp_awards_are_associative(amount in 0u64..3_000) {
        let mut once = level_engine();
        once.add_xp(amount, "bulk");
        let mut piecewise = level_engine();
        for _ in 0..amount {
            piecewise.add_xp(1, "drip");
        }
        prop_assert_eq!(once.state(), piecewise.state());
        prop_assert!(once.xp() < threshold_for(once.level()));
    }

    #[test]
    fn same_day_never_changes_streak(gaps in prop::collection::vec(0i64..4, 1..20), repeats in 1usize..4) {
        let mut streak = streak_engine(true, 3);
        let mut today = base_day();
        for gap in gaps {
            today += Duration::days(gap);
            streak.record_study_day(today);
            let snapshot = streak.state().clone();
            for _ in 0..repeats {
                prop_assert_eq!(streak.record_study_day(today), StreakOutcome::AlreadyRecorded);
            }
            prop_assert_eq!(streak.state(), &snapshot);
            prop_assert!(streak.longest() >= streak.current());
        }
    }

    #[test]
    fn consecutive_days_count_up(days in 1u32..60) {
        let mut streak = streak_engine(true, 3);
        for offset in 0..days {
            let before = streak.current();
            streak.record_study_day(base_day() + Duration::days(i64::from(offset)));
            prop_assert_eq!(streak.current(), before + 1);
            prop_assert_eq!(streak.longest(), streak.current());
        }
    }

    #[test]
    fn gaps_freeze_or_reset(run in 1u32..20, gap in 2i64..30, protection in any::<bool>(), freezes in 0u32..3) {
        let mut streak = streak_engine(protection, freezes);
        for offset in 0..run {
            streak.record_study_day(base_day() + Duration::days(i64::from(offset)));
        }
        let last = base_day() + Duration::days(i64::from(run - 1));
        streak.record_study_day(last + Duration::days(gap));

        if protection && freezes > 0 {
            prop_assert_eq!(streak.current(), run);
            prop_assert_eq!(streak.freezes(), freezes - 1);
        } else {
            prop_assert_eq!(streak.current(), 1);
            prop_assert_eq!(streak.freezes(), freezes);
        }
        prop_assert_eq!(streak.longest(), run);
    }

    #[test]
    fn rewards_fire_exactly_once(steps in prop::collection::vec(1u32..4, 1..30)) {
        let clock = Arc::new(ManualClock::on_day(base_day(), 9, 0));
        let mut challenges = ChallengeEngine::new(clock, Arc::new(MemoryStore::new()));
        let mut tally = Tally::default();
        let mut total = 0;
        for step in steps {
            total += step;
            challenges.update_progress(ChallengeCategory::TasksCompleted, step, &mut tally);
        }
        // "Productive" (goal 5) and "Organizer" (goal 20) both pay XP.
        let expected = u32::from(total >= 5) + u32::from(total >= 20);
        prop_assert_eq!(tally.xp_grants, expected);
        prop_assert_eq!(tally.freeze_grants, 0);
    }

    #[test]
    fn pause_always_cancels_completion(ticks in 0u32..1499) {
        let notifier = Arc::new(RecordingNotifier::new());
        let mut timer = TimerEngine::new(
            TimerConfig::default(),
            Arc::new(ManualClock::new(Utc::now())),
            notifier.clone(),
            Arc::new(MemoryStore::new()),
        );
        timer.start();
        for _ in 0..ticks {
            timer.tick();
        }
        prop_assert!(notifier.is_pending(FOCUS_TIMER_ID));
        timer.pause();
        prop_assert!(notifier.pending_ids().is_empty());
        prop_assert!(timer.remaining_secs() <= timer.total_secs());
    }
}
