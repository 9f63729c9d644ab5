use std::collections::BTreeMap;

use clap::Subcommand;
use serde::Serialize;
use studytrack_core::history::CategoryTotal;
use studytrack_core::{Stats, TimeRange};

use super::{print_json, with_tracker, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's progress and all-time totals
    Summary,
    /// Hours per day, week or month
    Chart {
        /// week, month or year
        #[arg(long, default_value = "week")]
        range: TimeRange,
    },
    /// Activity intensity for the last four weeks
    Heatmap,
    /// Hours studied per hour of day
    Hourly,
    /// Sessions and time per category
    Categories,
    /// Set the daily goal in hours
    Goal { hours: f64 },
}

#[derive(Serialize)]
struct Summary {
    today_hours: f64,
    daily_goal_hours: f64,
    daily_goal_progress: f64,
    total_hours: f64,
    sessions: usize,
    current_streak: u32,
    level: u32,
    tasks_completed: usize,
    tasks_pending: usize,
    challenges_completed: usize,
}

pub fn run(action: StatsAction) -> CmdResult {
    with_tracker(|tracker| {
        if let StatsAction::Goal { hours } = action {
            tracker.history_mut().set_daily_goal_hours(hours)?;
        }

        let history = tracker.history();
        let stats = Stats::new(history.sessions(), tracker.clock());
        match action {
            StatsAction::Summary | StatsAction::Goal { .. } => print_json(&Summary {
                today_hours: history.today_hours(),
                daily_goal_hours: history.daily_goal_hours(),
                daily_goal_progress: history.daily_goal_progress(),
                total_hours: history.total_hours(),
                sessions: history.sessions().len(),
                current_streak: tracker.streak().current(),
                level: tracker.level().level(),
                tasks_completed: tracker.tasks().completed_count(),
                tasks_pending: tracker.tasks().pending_count(),
                challenges_completed: tracker.challenges().completed_count(),
            }),
            StatsAction::Chart { range } => print_json(&stats.chart(range)),
            StatsAction::Heatmap => print_json(&stats.heatmap()),
            StatsAction::Hourly => print_json(&stats.hourly_distribution()),
            StatsAction::Categories => {
                let totals: BTreeMap<String, CategoryTotal> = history.by_category();
                print_json(&totals)
            }
        }
    })
}
