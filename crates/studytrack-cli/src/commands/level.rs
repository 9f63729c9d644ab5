use clap::Subcommand;
use serde::Serialize;
use studytrack_core::{threshold_for, LevelTitle};

use super::{print_json, with_tracker, CmdResult};

#[derive(Subcommand)]
pub enum LevelAction {
    /// Show level, XP and title
    Status,
    /// XP needed for each level
    Thresholds {
        /// Last level to list
        #[arg(long, default_value = "10")]
        up_to: u32,
    },
}

#[derive(Serialize)]
struct Status {
    level: u32,
    title: LevelTitle,
    xp: u64,
    threshold: u64,
    xp_to_next: u64,
    progress: f64,
}

#[derive(Serialize)]
struct Row {
    level: u32,
    title: LevelTitle,
    threshold: u64,
}

pub fn run(action: LevelAction) -> CmdResult {
    match action {
        LevelAction::Status => with_tracker(|tracker| {
            let state = tracker.level().state();
            print_json(&Status {
                level: state.level,
                title: state.title(),
                xp: state.xp,
                threshold: threshold_for(state.level),
                xp_to_next: state.xp_to_next(),
                progress: state.progress(),
            })
        }),
        LevelAction::Thresholds { up_to } => {
            let rows: Vec<Row> = (1..=up_to.max(1))
                .map(|level| Row {
                    level,
                    title: LevelTitle::for_level(level),
                    threshold: threshold_for(level),
                })
                .collect();
            print_json(&rows)
        }
    }
}
