use clap::Subcommand;
use serde::Serialize;

use super::{print_json, with_tracker, CmdResult};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show the current streak
    Status,
    /// Spend a freeze by hand
    Freeze,
    /// Add freezes
    AddFreezes { count: u32 },
    /// Toggle automatic freeze protection
    Protect,
    /// Overwrite the current streak
    Set { days: u32 },
    /// Zero the current streak (longest is kept)
    Reset,
    /// Forget all streak data
    ResetAll,
}

#[derive(Serialize)]
struct Status {
    current: u32,
    longest: u32,
    freezes: u32,
    protection: bool,
    last_study_day: Option<chrono::NaiveDate>,
    frozen_today: bool,
    next_milestone: Option<u32>,
    milestone_progress: f64,
}

pub fn run(action: StreakAction) -> CmdResult {
    with_tracker(|tracker| {
        let streak = tracker.streak_mut();
        match action {
            StreakAction::Status => {}
            StreakAction::Freeze => {
                if !streak.use_freeze() {
                    return Err("no freezes left".into());
                }
            }
            StreakAction::AddFreezes { count } => streak.add_freezes(count),
            StreakAction::Protect => {
                streak.toggle_protection();
            }
            StreakAction::Set { days } => streak.set_streak(days),
            StreakAction::Reset => streak.reset_streak(),
            StreakAction::ResetAll => streak.reset_all(),
        }

        let streak = tracker.streak();
        print_json(&Status {
            current: streak.current(),
            longest: streak.longest(),
            freezes: streak.freezes(),
            protection: streak.protection(),
            last_study_day: streak.last_study_day(),
            frozen_today: streak.is_frozen_today(),
            next_milestone: streak.next_milestone(),
            milestone_progress: streak.milestone_progress(),
        })
    })
}
